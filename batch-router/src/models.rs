//! Batch requests and results.

use num_bigint::{BigInt, BigUint};
use router_common::{
    models::{
        path::{ExactInPath, ExactOutPath},
        Address,
    },
    serde_primitives::{bigint_string, biguint_string, biguint_string_vec},
    Bytes,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactInRequest {
    pub sender: Address,
    pub paths: Vec<ExactInPath>,
    pub deadline: u64,
    #[serde(default)]
    pub native_asset_mode: bool,
    /// Forwarded untouched to pool hooks.
    #[serde(default)]
    pub user_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactOutRequest {
    pub sender: Address,
    pub paths: Vec<ExactOutPath>,
    pub deadline: u64,
    #[serde(default)]
    pub native_asset_mode: bool,
    #[serde(default)]
    pub user_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDelta {
    pub token: Address,
    /// Positive when the caller received, negative when the caller paid.
    #[serde(with = "bigint_string")]
    pub delta: BigInt,
}

/// Outcome of a batch swap.
///
/// For exact in batches `path_amounts` are the realized outputs and `tokens`/`amounts` the
/// distinct tokens received. For exact out batches they are the realized inputs and the distinct
/// tokens paid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSwapResult {
    #[serde(with = "biguint_string_vec")]
    pub path_amounts: Vec<BigUint>,
    pub tokens: Vec<Address>,
    #[serde(with = "biguint_string_vec")]
    pub amounts: Vec<BigUint>,
    pub net_deltas: Vec<TokenDelta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityToWrappedPoolRequest {
    pub sender: Address,
    /// A pool whose tokens may be wrapped assets.
    pub pool: Address,
    /// Underlying amounts in pool token order. Unwrapped pool tokens are deposited as is.
    #[serde(with = "biguint_string_vec")]
    pub exact_underlying_amounts_in: Vec<BigUint>,
    #[serde(with = "biguint_string")]
    pub min_pool_tokens_out: BigUint,
    pub deadline: u64,
    #[serde(default)]
    pub native_asset_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityFromWrappedPoolRequest {
    pub sender: Address,
    pub pool: Address,
    #[serde(with = "biguint_string")]
    pub exact_pool_tokens_in: BigUint,
    /// Minimum underlying amounts out in pool token order.
    #[serde(with = "biguint_string_vec")]
    pub min_underlying_amounts_out: Vec<BigUint>,
    pub deadline: u64,
    #[serde(default)]
    pub native_asset_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedLiquidityResult {
    #[serde(with = "biguint_string")]
    pub pool_tokens: BigUint,
    /// Underlying tokens in pool token order.
    pub tokens: Vec<Address>,
    #[serde(with = "biguint_string_vec")]
    pub amounts: Vec<BigUint>,
    pub net_deltas: Vec<TokenDelta>,
}

/// Per token totals kept in first appearance order.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenTotals {
    tokens: Vec<Address>,
    amounts: Vec<BigUint>,
}

impl TokenTotals {
    pub(crate) fn add(&mut self, token: &Address, amount: &BigUint) {
        match self.tokens.iter().position(|t| t == token) {
            Some(index) => self.amounts[index] += amount,
            None => {
                self.tokens.push(token.clone());
                self.amounts.push(amount.clone());
            }
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Address>, Vec<BigUint>) {
        (self.tokens, self.amounts)
    }
}
