//! Requests and outcomes exchanged between the router and the ledger.

use num_bigint::BigUint;

use crate::{
    models::{Address, SwapKind},
    Bytes,
};

/// A single pool swap.
///
/// `limit` bounds the calculated amount: a minimum output for `ExactIn`, a maximum input for
/// `ExactOut`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub kind: SwapKind,
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_given: BigUint,
    pub limit: Option<BigUint>,
    pub user_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Output for `ExactIn`, input for `ExactOut`, after any hook adjustment.
    pub amount_calculated: BigUint,
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    pub hook_adjustment: Option<HookAdjustment>,
}

/// What a hook promised to move for a swap and what the ledger actually moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookAdjustment {
    pub hook: Address,
    pub token: Address,
    pub promised: BigUint,
    pub settled: BigUint,
}

impl HookAdjustment {
    pub fn is_settled(&self) -> bool {
        self.promised == self.settled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddLiquidityKind {
    /// Deposit exact amounts of every pool token (in pool token order).
    Unbalanced { exact_amounts_in: Vec<BigUint>, min_pool_tokens_out: Option<BigUint> },
    /// Mint an exact amount of pool tokens paying with a single token.
    SingleTokenExactOut {
        token: Address,
        exact_pool_tokens_out: BigUint,
        max_amount_in: Option<BigUint>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityRequest {
    pub pool: Address,
    pub kind: AddLiquidityKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveLiquidityKind {
    SingleTokenExactIn {
        exact_pool_tokens_in: BigUint,
        token: Address,
        min_amount_out: Option<BigUint>,
    },
    SingleTokenExactOut {
        token: Address,
        exact_amount_out: BigUint,
        max_pool_tokens_in: Option<BigUint>,
    },
    Proportional { exact_pool_tokens_in: BigUint, min_amounts_out: Option<Vec<BigUint>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityRequest {
    pub pool: Address,
    pub kind: RemoveLiquidityKind,
}

/// Result of an add or remove liquidity operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityOutcome {
    /// Pool tokens minted (add) or burned (remove).
    pub pool_tokens: BigUint,
    /// Per token amounts in pool token order, paid in (add) or paid out (remove).
    pub amounts: Vec<BigUint>,
}

impl LiquidityOutcome {
    pub fn new(pool_tokens: BigUint, amounts: Vec<BigUint>) -> Self {
        Self { pool_tokens, amounts }
    }
}

/// Result of a wrap or unwrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    /// Whether the buffer reserve served the conversion.
    pub used_buffer: bool,
}

/// Who funds pool tokens moved into the router's working balance ahead of a burn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LendSource {
    /// Taken straight from the given account's holdings.
    Caller(Address),
    /// Flash loaned by the ledger, recorded as transient debt.
    Ledger,
}
