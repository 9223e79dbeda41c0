use num_bigint::{BigInt, BigUint};
use thiserror::Error;

use crate::models::Address;

/// Failures raised by the ledger and its collaborators.
///
/// Every variant aborts the operation that raised it. The ledger never partially applies a
/// failing operation, but callers that batch operations are responsible for discarding earlier
/// successful ones.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Pool {0} is not registered")]
    PoolNotRegistered(Address),
    #[error("Token {token} is not part of pool {pool}")]
    TokenNotInPool { pool: Address, token: Address },
    #[error("Buffer for wrapped token {0} is not initialized")]
    BufferNotInitialized(Address),
    #[error("Wrapped token {0} is not registered")]
    WrappedTokenNotRegistered(Address),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Account {account} holds {available} of {token}, needs {required}")]
    InsufficientBalance { account: Address, token: Address, available: BigUint, required: BigUint },
    #[error("Working balance of {token} is {available}, needs {required}")]
    InsufficientWorkingBalance { token: Address, available: BigUint, required: BigUint },
    #[error("Insufficient liquidity of {token}: available {available}, required {required}")]
    InsufficientLiquidity { token: Address, available: BigUint, required: BigUint },
    #[error("Trade amount {amount} is below the minimum of {minimum}")]
    TradeAmountTooSmall { amount: BigUint, minimum: BigUint },
    #[error("Wrap amount {amount} is below the minimum of {minimum}")]
    WrapAmountTooSmall { amount: BigUint, minimum: BigUint },
    #[error("Swap limit exceeded: calculated {amount}, limit {limit}")]
    SwapLimit { amount: BigUint, limit: BigUint },
    #[error("Amount in of {token} is {amount}, above the maximum of {limit}")]
    AmountInAboveMax { token: Address, amount: BigUint, limit: BigUint },
    #[error("Amount out of {token} is {amount}, below the minimum of {limit}")]
    AmountOutBelowMin { token: Address, amount: BigUint, limit: BigUint },
    #[error("Balance of {token} not settled: promised {promised}, settled {settled}")]
    BalanceNotSettled { token: Address, promised: BigInt, settled: BigInt },
    #[error("Math error: {0}")]
    Math(String),
    #[error("Hook error: {0}")]
    Hook(String),
}
