use num_bigint::{BigInt, BigUint};
use router_common::{errors::VaultError, models::Address};
use thiserror::Error;

/// Caller facing failures of a batch.
///
/// Any of these aborts the whole batch: nothing resolved before the failure is committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Deadline {deadline} expired, current time is {now}")]
    DeadlineExpired { deadline: u64, now: u64 },
    /// A path's realized output fell below its minimum, or its realized input rose above its
    /// maximum.
    #[error("Path {path} violated its swap limit: amount {amount}, limit {limit}")]
    SwapLimit { path: usize, amount: BigUint, limit: BigUint },
    #[error("Amount in of {token} is {amount}, above the maximum of {limit}")]
    AmountInAboveMax { token: Address, amount: BigUint, limit: BigUint },
    #[error("Amount out of {token} is {amount}, below the minimum of {limit}")]
    AmountOutBelowMin { token: Address, amount: BigUint, limit: BigUint },
    #[error("Trade amount {amount} is below the minimum of {minimum}")]
    TradeTooSmall { amount: BigUint, minimum: BigUint },
    #[error("Borrow of {token} not reconciled: borrowed {borrowed}, consumed {consumed}")]
    UnreconciledBorrow { token: Address, borrowed: BigUint, consumed: BigUint },
    #[error("Balance of {token} not settled: promised {promised}, settled {settled}")]
    BalanceNotSettled { token: Address, promised: BigInt, settled: BigInt },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Vault(VaultError),
}

impl RouterError {
    /// Attributes a bound violation raised while resolving `path` to that path.
    pub fn for_path(self, path: usize) -> Self {
        match self {
            RouterError::AmountInAboveMax { amount, limit, .. } |
            RouterError::AmountOutBelowMin { amount, limit, .. } |
            RouterError::UnreconciledBorrow { consumed: amount, borrowed: limit, .. } |
            RouterError::Vault(VaultError::SwapLimit { amount, limit }) => {
                RouterError::SwapLimit { path, amount, limit }
            }
            other => other,
        }
    }
}

impl From<VaultError> for RouterError {
    fn from(error: VaultError) -> Self {
        match error {
            VaultError::TradeAmountTooSmall { amount, minimum } |
            VaultError::WrapAmountTooSmall { amount, minimum } => {
                RouterError::TradeTooSmall { amount, minimum }
            }
            VaultError::AmountInAboveMax { token, amount, limit } => {
                RouterError::AmountInAboveMax { token, amount, limit }
            }
            VaultError::AmountOutBelowMin { token, amount, limit } => {
                RouterError::AmountOutBelowMin { token, amount, limit }
            }
            VaultError::BalanceNotSettled { token, promised, settled } => {
                RouterError::BalanceNotSettled { token, promised, settled }
            }
            VaultError::InvalidConfiguration(reason) => RouterError::InvalidConfiguration(reason),
            other => RouterError::Vault(other),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use router_common::Bytes;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::trade(VaultError::TradeAmountTooSmall { amount: 1u32.into(), minimum: 2u32.into() })]
    #[case::wrap(VaultError::WrapAmountTooSmall { amount: 1u32.into(), minimum: 2u32.into() })]
    fn test_too_small_amounts_map_to_trade_too_small(#[case] error: VaultError) {
        assert_eq!(
            RouterError::from(error),
            RouterError::TradeTooSmall { amount: 1u32.into(), minimum: 2u32.into() }
        );
    }

    #[test]
    fn test_bound_violations_are_attributed_to_path() {
        let error = RouterError::from(VaultError::AmountInAboveMax {
            token: Bytes::from_low_u64(1),
            amount: 5u32.into(),
            limit: 3u32.into(),
        });

        assert_eq!(
            error.for_path(2),
            RouterError::SwapLimit { path: 2, amount: 5u32.into(), limit: 3u32.into() }
        );
    }

    #[test]
    fn test_unrelated_errors_pass_through() {
        let error = RouterError::from(VaultError::PoolNotRegistered(Bytes::from_low_u64(1)));

        assert_eq!(
            error.for_path(0),
            RouterError::Vault(VaultError::PoolNotRegistered(Bytes::from_low_u64(1)))
        );
    }
}
