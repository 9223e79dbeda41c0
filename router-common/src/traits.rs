//! Interfaces the router consumes from the ledger.
//!
//! The ledger owns every balance: pool balances, buffer reserves, account holdings and the
//! transient deltas accumulated while a batch runs. The router only ever reads and mutates them
//! through these traits.

use std::fmt::Debug;

use num_bigint::{BigInt, BigUint};

use crate::{
    errors::VaultError,
    models::{
        operation::{
            AddLiquidityRequest, ConversionOutcome, LendSource, LiquidityOutcome,
            RemoveLiquidityRequest, SwapOutcome, SwapRequest,
        },
        Address, BufferState, SwapKind, WrappingDirection,
    },
    Bytes,
};

/// Swap and liquidity primitives of registered pools.
pub trait PoolOperations {
    /// Tokens of a pool in registration order.
    fn pool_tokens(&self, pool: &Address) -> Result<Vec<Address>, VaultError>;

    /// Swaps within a pool, crediting the output and debiting the input in transient accounting.
    fn swap(&mut self, request: &SwapRequest) -> Result<SwapOutcome, VaultError>;

    /// Adds liquidity, debiting the deposited tokens and crediting the minted pool tokens.
    fn add_liquidity(
        &mut self,
        request: &AddLiquidityRequest,
    ) -> Result<LiquidityOutcome, VaultError>;

    /// Removes liquidity, burning pool tokens from the working balance and crediting the
    /// withdrawn tokens.
    fn remove_liquidity(
        &mut self,
        request: &RemoveLiquidityRequest,
    ) -> Result<LiquidityOutcome, VaultError>;

    /// Pool tokens that would be burned to withdraw `exact_amount_out` of `token`, without
    /// mutating anything.
    fn query_remove_liquidity_single_token_exact_out(
        &self,
        pool: &Address,
        token: &Address,
        exact_amount_out: &BigUint,
    ) -> Result<BigUint, VaultError>;
}

/// Wrapped asset conversions and the buffers that short-circuit them.
pub trait BufferOperations {
    /// The underlying asset of a registered wrapped token.
    fn underlying_of(&self, wrapped: &Address) -> Option<Address>;

    fn buffer(&self, wrapped: &Address) -> Result<BufferState, VaultError>;

    /// Counter amount of a conversion at the wrapper's current rate.
    ///
    /// For `ExactIn` `amount` is the input and the output is returned, rounded down. For
    /// `ExactOut` `amount` is the output and the required input is returned, rounded up.
    fn preview_conversion(
        &self,
        wrapped: &Address,
        direction: WrappingDirection,
        kind: SwapKind,
        amount: &BigUint,
    ) -> Result<BigUint, VaultError>;

    /// Serves a conversion from the buffer reserves. The reserve gains `amount_in` and pays
    /// `amount_out`.
    fn trade_with_buffer(
        &mut self,
        wrapped: &Address,
        direction: WrappingDirection,
        amount_in: &BigUint,
        amount_out: &BigUint,
    ) -> Result<ConversionOutcome, VaultError>;

    /// Converts through the wrapped asset itself, leaving the buffer untouched.
    fn convert_directly(
        &mut self,
        wrapped: &Address,
        direction: WrappingDirection,
        amount_in: &BigUint,
        amount_out: &BigUint,
    ) -> Result<ConversionOutcome, VaultError>;
}

/// Transient accounting and final settlement.
pub trait Settlement {
    /// Current ledger time in seconds.
    fn now(&self) -> u64;

    fn wrapped_native(&self) -> Option<Address>;

    fn balance_of(&self, account: &Address, token: &Address) -> BigUint;

    /// Signed amount the ledger currently owes the router (negative: the router owes).
    fn transient_delta(&self, token: &Address) -> BigInt;

    /// Pool tokens the ledger is able to flash loan.
    fn lendable(&self, token: &Address) -> BigUint;

    /// Moves pool tokens into the router's working balance.
    fn lend(
        &mut self,
        token: &Address,
        amount: &BigUint,
        source: &LendSource,
    ) -> Result<(), VaultError>;

    /// Returns unused pool tokens from the working balance to whoever lent them.
    fn repay(
        &mut self,
        token: &Address,
        amount: &BigUint,
        source: &LendSource,
    ) -> Result<(), VaultError>;

    /// Settles net per token deltas with `account` atomically. Negative deltas are charged,
    /// positive ones credited. Fails unless every transient delta and working balance ends at
    /// zero.
    fn charge_then_credit(
        &mut self,
        account: &Address,
        deltas: &[(Address, BigInt)],
        native_asset_mode: bool,
    ) -> Result<(), VaultError>;
}

/// Everything the router needs from a ledger.
///
/// `Clone` is what lets the router run a batch against a disposable copy.
pub trait Vault: PoolOperations + BufferOperations + Settlement + Clone + Debug {}

impl<T> Vault for T where T: PoolOperations + BufferOperations + Settlement + Clone + Debug {}

/// Parameters handed to a hook after a pool computed a swap.
#[derive(Debug, Clone)]
pub struct AfterSwapParams<'a> {
    pub kind: SwapKind,
    pub pool: &'a Address,
    pub token_in: &'a Address,
    pub token_out: &'a Address,
    pub amount_in: &'a BigUint,
    pub amount_out: &'a BigUint,
    /// The pool's own result before the hook runs.
    pub amount_calculated: &'a BigUint,
    pub user_data: &'a Bytes,
}

/// Callback attached to a pool that may adjust the calculated amount of a swap.
pub trait SwapHook: Debug + Send + Sync + 'static {
    /// Returns the adjusted amount calculated.
    fn on_after_swap(&self, params: &AfterSwapParams<'_>) -> Result<BigUint, VaultError>;

    /// Clones the hook as a trait object.
    fn clone_box(&self) -> Box<dyn SwapHook>;
}

impl Clone for Box<dyn SwapHook> {
    fn clone(&self) -> Box<dyn SwapHook> {
        self.clone_box()
    }
}
