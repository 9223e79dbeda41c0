//! JSON scenarios: a ledger seed plus one batch to run against it.

use std::{fs, path::Path};

use anyhow::Context;
use router_common::vault::{InMemoryVault, VaultSeed};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    models::{
        AddLiquidityToWrappedPoolRequest, BatchSwapResult, RemoveLiquidityFromWrappedPoolRequest,
        SwapExactInRequest, SwapExactOutRequest, WrappedLiquidityResult,
    },
    router::BatchRouter,
    RouterError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioBatch {
    ExactIn(SwapExactInRequest),
    ExactOut(SwapExactOutRequest),
    AddLiquidityToWrappedPool(AddLiquidityToWrappedPoolRequest),
    RemoveLiquidityFromWrappedPool(RemoveLiquidityFromWrappedPoolRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub ledger: VaultSeed,
    pub batch: ScenarioBatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Swap(BatchSwapResult),
    Liquidity(WrappedLiquidityResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    pub committed: bool,
    pub result: BatchOutcome,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scenario {}", path.display()))
    }

    /// Seeds a fresh ledger and runs the batch on it, committing unless `query` is set.
    pub fn run(&self, query: bool) -> anyhow::Result<ScenarioOutcome> {
        let vault = InMemoryVault::from_seed(self.ledger.clone())?;
        let mut router = BatchRouter::new(vault);
        let result = self.execute(&mut router, query)?;
        info!(query, "Scenario finished");
        Ok(ScenarioOutcome { committed: !query, result })
    }

    fn execute(
        &self,
        router: &mut BatchRouter<InMemoryVault>,
        query: bool,
    ) -> Result<BatchOutcome, RouterError> {
        let outcome = match (&self.batch, query) {
            (ScenarioBatch::ExactIn(request), true) => {
                BatchOutcome::Swap(router.query_swap_exact_in(request)?)
            }
            (ScenarioBatch::ExactIn(request), false) => {
                BatchOutcome::Swap(router.swap_exact_in(request)?)
            }
            (ScenarioBatch::ExactOut(request), true) => {
                BatchOutcome::Swap(router.query_swap_exact_out(request)?)
            }
            (ScenarioBatch::ExactOut(request), false) => {
                BatchOutcome::Swap(router.swap_exact_out(request)?)
            }
            (ScenarioBatch::AddLiquidityToWrappedPool(request), true) => BatchOutcome::Liquidity(
                router.query_add_liquidity_unbalanced_to_wrapped_pool(request)?,
            ),
            (ScenarioBatch::AddLiquidityToWrappedPool(request), false) => {
                BatchOutcome::Liquidity(router.add_liquidity_unbalanced_to_wrapped_pool(request)?)
            }
            (ScenarioBatch::RemoveLiquidityFromWrappedPool(request), true) => {
                BatchOutcome::Liquidity(
                    router.query_remove_liquidity_proportional_from_wrapped_pool(request)?,
                )
            }
            (ScenarioBatch::RemoveLiquidityFromWrappedPool(request), false) => {
                BatchOutcome::Liquidity(
                    router.remove_liquidity_proportional_from_wrapped_pool(request)?,
                )
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;

    use super::*;

    const SCENARIO: &str = r#"{
        "ledger": {
            "timestamp": 100,
            "pools": [{
                "address": "0x00000000000000000000000000000000000000aa",
                "kind": "linear",
                "tokens": [
                    "0x0000000000000000000000000000000000000001",
                    "0x0000000000000000000000000000000000000002"
                ],
                "balances": ["1000000000000000000000", "1000000000000000000000"]
            }],
            "balances": [{
                "account": "0x00000000000000000000000000000000000000a1",
                "token": "0x0000000000000000000000000000000000000001",
                "amount": "5000000000000000000"
            }]
        },
        "batch": {
            "kind": "exact_in",
            "sender": "0x00000000000000000000000000000000000000a1",
            "deadline": 200,
            "paths": [{
                "token_in": "0x0000000000000000000000000000000000000001",
                "steps": [{
                    "pool": "0x00000000000000000000000000000000000000aa",
                    "token_out": "0x0000000000000000000000000000000000000002"
                }],
                "exact_amount_in": "1000000000000000000",
                "min_amount_out": "1"
            }]
        }
    }"#;

    fn one_ether() -> BigUint {
        BigUint::from(1_000_000_000_000_000_000u64)
    }

    #[test]
    fn test_scenario_deserialize() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).expect("scenario parses");

        assert_eq!(scenario.ledger.pools.len(), 1);
        assert!(matches!(scenario.batch, ScenarioBatch::ExactIn(ref r) if r.paths.len() == 1));
    }

    #[test]
    fn test_scenario_run_query_matches_commit() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).expect("scenario parses");

        let queried = scenario.run(true).expect("query succeeds");
        let committed = scenario.run(false).expect("commit succeeds");

        assert!(!queried.committed);
        assert!(committed.committed);
        assert_eq!(queried.result, committed.result);
        match committed.result {
            BatchOutcome::Swap(result) => assert_eq!(result.path_amounts, vec![one_ether()]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_bundled_scenario() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/redeem_then_swap.json");
        let scenario = Scenario::from_file(path).expect("bundled scenario loads");

        let outcome = scenario.run(true).expect("bundled scenario resolves");

        match outcome.result {
            BatchOutcome::Swap(result) => {
                let amount_in = &result.path_amounts[0];
                assert!(amount_in > &BigUint::from(1_000_000_000_000_000u64));
                assert!(amount_in < &one_ether());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_scenario_from_missing_file() {
        let res = Scenario::from_file("does/not/exist.json");

        assert!(res.is_err());
    }
}
