//! Liquidity operations on pools whose tokens are wrapped assets.
//!
//! Callers deal in underlying assets: adds wrap each amount through its buffer before
//! depositing, removals unwrap each withdrawn amount afterwards. Pool tokens that are not
//! wrapped assets pass through unchanged.

use num_bigint::BigUint;
use num_traits::Zero;
use router_common::{
    models::{
        operation::{
            AddLiquidityKind, AddLiquidityRequest, LendSource, RemoveLiquidityKind,
            RemoveLiquidityRequest,
        },
        SwapKind, WrappingDirection,
    },
    traits::Vault,
};
use tracing::{debug, info, instrument};

use crate::{
    errors::RouterError,
    models::{
        AddLiquidityToWrappedPoolRequest, RemoveLiquidityFromWrappedPoolRequest,
        WrappedLiquidityResult,
    },
    operations::buffer::wrap_or_unwrap,
    router::{check_deadline, BatchRouter},
    settlement::SettlementAggregator,
};

impl<V: Vault> BatchRouter<V> {
    pub fn add_liquidity_unbalanced_to_wrapped_pool(
        &mut self,
        request: &AddLiquidityToWrappedPoolRequest,
    ) -> Result<WrappedLiquidityResult, RouterError> {
        self.commit(|vault| run_add(vault, request))
    }

    pub fn query_add_liquidity_unbalanced_to_wrapped_pool(
        &self,
        request: &AddLiquidityToWrappedPoolRequest,
    ) -> Result<WrappedLiquidityResult, RouterError> {
        self.query(|vault| run_add(vault, request))
    }

    pub fn remove_liquidity_proportional_from_wrapped_pool(
        &mut self,
        request: &RemoveLiquidityFromWrappedPoolRequest,
    ) -> Result<WrappedLiquidityResult, RouterError> {
        self.commit(|vault| run_remove(vault, request))
    }

    pub fn query_remove_liquidity_proportional_from_wrapped_pool(
        &self,
        request: &RemoveLiquidityFromWrappedPoolRequest,
    ) -> Result<WrappedLiquidityResult, RouterError> {
        self.query(|vault| run_remove(vault, request))
    }
}

fn check_length(expected: usize, actual: usize, what: &str) -> Result<(), RouterError> {
    if expected != actual {
        return Err(RouterError::InvalidConfiguration(format!(
            "expected {expected} {what}, got {actual}"
        )));
    }
    Ok(())
}

#[instrument(skip_all, fields(pool = %request.pool, sender = %request.sender))]
fn run_add<V: Vault>(
    vault: &mut V,
    request: &AddLiquidityToWrappedPoolRequest,
) -> Result<WrappedLiquidityResult, RouterError> {
    check_deadline(vault, request.deadline)?;
    let pool_tokens = vault.pool_tokens(&request.pool)?;
    check_length(pool_tokens.len(), request.exact_underlying_amounts_in.len(), "amounts in")?;

    let mut aggregator = SettlementAggregator::default();
    let mut tokens = Vec::with_capacity(pool_tokens.len());
    let mut exact_amounts_in = Vec::with_capacity(pool_tokens.len());
    for (token, amount) in pool_tokens
        .iter()
        .zip(&request.exact_underlying_amounts_in)
    {
        let (underlying, deposit) = match vault.underlying_of(token) {
            Some(underlying) if !amount.is_zero() => {
                let outcome = wrap_or_unwrap(
                    vault,
                    token,
                    WrappingDirection::Wrap,
                    SwapKind::ExactIn,
                    amount,
                )?;
                (underlying, outcome.amount_out)
            }
            Some(underlying) => (underlying, BigUint::zero()),
            None => (token.clone(), amount.clone()),
        };
        if !amount.is_zero() {
            aggregator.charge(&underlying, amount);
        }
        debug!(%token, %underlying, %amount, %deposit, "Prepared deposit");
        tokens.push(underlying);
        exact_amounts_in.push(deposit);
    }

    let outcome = vault.add_liquidity(&AddLiquidityRequest {
        pool: request.pool.clone(),
        kind: AddLiquidityKind::Unbalanced { exact_amounts_in, min_pool_tokens_out: None },
    })?;
    if outcome.pool_tokens < request.min_pool_tokens_out {
        return Err(RouterError::AmountOutBelowMin {
            token: request.pool.clone(),
            amount: outcome.pool_tokens,
            limit: request.min_pool_tokens_out.clone(),
        });
    }
    aggregator.credit(&request.pool, &outcome.pool_tokens);

    let net_deltas = aggregator.settle(vault, &request.sender, request.native_asset_mode)?;
    info!(minted = %outcome.pool_tokens, "Liquidity added to wrapped pool");
    Ok(WrappedLiquidityResult {
        pool_tokens: outcome.pool_tokens,
        tokens,
        amounts: request.exact_underlying_amounts_in.clone(),
        net_deltas,
    })
}

#[instrument(skip_all, fields(pool = %request.pool, sender = %request.sender))]
fn run_remove<V: Vault>(
    vault: &mut V,
    request: &RemoveLiquidityFromWrappedPoolRequest,
) -> Result<WrappedLiquidityResult, RouterError> {
    check_deadline(vault, request.deadline)?;
    let pool_tokens = vault.pool_tokens(&request.pool)?;
    check_length(
        pool_tokens.len(),
        request.min_underlying_amounts_out.len(),
        "minimum amounts out",
    )?;

    let mut aggregator = SettlementAggregator::default();
    vault.lend(
        &request.pool,
        &request.exact_pool_tokens_in,
        &LendSource::Caller(request.sender.clone()),
    )?;
    aggregator.record_direct(&request.pool, &request.exact_pool_tokens_in);
    let outcome = vault.remove_liquidity(&RemoveLiquidityRequest {
        pool: request.pool.clone(),
        kind: RemoveLiquidityKind::Proportional {
            exact_pool_tokens_in: request.exact_pool_tokens_in.clone(),
            min_amounts_out: None,
        },
    })?;

    let mut tokens = Vec::with_capacity(pool_tokens.len());
    let mut amounts = Vec::with_capacity(pool_tokens.len());
    for ((token, withdrawn), limit) in pool_tokens
        .iter()
        .zip(&outcome.amounts)
        .zip(&request.min_underlying_amounts_out)
    {
        let (underlying, amount) = match vault.underlying_of(token) {
            Some(underlying) if !withdrawn.is_zero() => {
                let outcome = wrap_or_unwrap(
                    vault,
                    token,
                    WrappingDirection::Unwrap,
                    SwapKind::ExactIn,
                    withdrawn,
                )?;
                (underlying, outcome.amount_out)
            }
            Some(underlying) => (underlying, BigUint::zero()),
            None => (token.clone(), withdrawn.clone()),
        };
        if &amount < limit {
            return Err(RouterError::AmountOutBelowMin {
                token: underlying,
                amount,
                limit: limit.clone(),
            });
        }
        if !amount.is_zero() {
            aggregator.credit(&underlying, &amount);
        }
        debug!(%token, %underlying, %withdrawn, %amount, "Prepared withdrawal");
        tokens.push(underlying);
        amounts.push(amount);
    }

    let net_deltas = aggregator.settle(vault, &request.sender, request.native_asset_mode)?;
    info!(burned = %request.exact_pool_tokens_in, "Liquidity removed from wrapped pool");
    Ok(WrappedLiquidityResult {
        pool_tokens: request.exact_pool_tokens_in.clone(),
        tokens,
        amounts,
        net_deltas,
    })
}
