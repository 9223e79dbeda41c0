use num_bigint::BigUint;
use router_common::{
    models::{operation::ConversionOutcome, Address, SwapKind, WrappingDirection},
    traits::BufferOperations,
};
use tracing::trace;

use crate::errors::RouterError;

/// Wraps or unwraps through the buffer of `wrapped`.
///
/// The conversion is priced at the wrapper's own rate either way. The buffer serves it only if
/// its outgoing reserve covers the whole output; otherwise the wrapper converts directly and the
/// buffer is left as it was.
pub fn wrap_or_unwrap<V: BufferOperations>(
    vault: &mut V,
    wrapped: &Address,
    direction: WrappingDirection,
    kind: SwapKind,
    amount: &BigUint,
) -> Result<ConversionOutcome, RouterError> {
    let counter = vault.preview_conversion(wrapped, direction, kind, amount)?;
    let (amount_in, amount_out) = match kind {
        SwapKind::ExactIn => (amount.clone(), counter),
        SwapKind::ExactOut => (counter, amount.clone()),
    };

    let state = vault.buffer(wrapped)?;
    let outcome = if state.outgoing_reserve(direction) >= &amount_out {
        trace!(%wrapped, %direction, %amount_in, %amount_out, "Converting through buffer");
        vault.trade_with_buffer(wrapped, direction, &amount_in, &amount_out)?
    } else {
        trace!(
            %wrapped,
            %direction,
            reserve = %state.outgoing_reserve(direction),
            %amount_out,
            "Buffer reserve too low, converting directly"
        );
        vault.convert_directly(wrapped, direction, &amount_in, &amount_out)?
    };
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use router_common::{
        models::BufferState,
        vault::{wrapped::WrappedToken, BufferConfig, InMemoryVault, VaultSeed},
        Bytes,
    };
    use rstest::rstest;

    use super::*;

    fn e18(value: u64) -> BigUint {
        BigUint::from(value) * BigUint::from(10u64).pow(18)
    }

    fn addr(value: u64) -> Address {
        Bytes::from_low_u64(value)
    }

    /// Wrapped token 10 over underlying 1 at 2 assets per share.
    fn vault() -> InMemoryVault {
        InMemoryVault::from_seed(VaultSeed {
            wrapped_tokens: vec![WrappedToken {
                address: addr(10),
                underlying: addr(1),
                total_assets: e18(2_000),
                total_supply: e18(1_000),
            }],
            buffers: vec![BufferConfig {
                wrapped: addr(10),
                underlying: addr(1),
                underlying_balance: e18(100),
                wrapped_balance: e18(50),
            }],
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case::wrap_exact_in(WrappingDirection::Wrap, SwapKind::ExactIn, e18(20), e18(20), e18(10))]
    #[case::wrap_exact_out(WrappingDirection::Wrap, SwapKind::ExactOut, e18(10), e18(20), e18(10))]
    #[case::unwrap_exact_in(
        WrappingDirection::Unwrap,
        SwapKind::ExactIn,
        e18(10),
        e18(10),
        e18(20)
    )]
    #[case::unwrap_exact_out(
        WrappingDirection::Unwrap,
        SwapKind::ExactOut,
        e18(20),
        e18(10),
        e18(20)
    )]
    fn test_small_conversions_use_buffer(
        #[case] direction: WrappingDirection,
        #[case] kind: SwapKind,
        #[case] amount: BigUint,
        #[case] expected_in: BigUint,
        #[case] expected_out: BigUint,
    ) {
        let mut vault = vault();

        let outcome = wrap_or_unwrap(&mut vault, &addr(10), direction, kind, &amount).unwrap();

        assert_eq!(
            outcome,
            ConversionOutcome {
                amount_in: expected_in,
                amount_out: expected_out,
                used_buffer: true
            }
        );
        assert_ne!(vault.buffer(&addr(10)).unwrap(), BufferState::new(e18(100), e18(50)));
    }

    #[test]
    fn test_large_conversion_falls_back_without_touching_buffer() {
        let mut vault = vault();

        let outcome = wrap_or_unwrap(
            &mut vault,
            &addr(10),
            WrappingDirection::Unwrap,
            SwapKind::ExactIn,
            &e18(60),
        )
        .unwrap();

        assert!(!outcome.used_buffer);
        assert_eq!(outcome.amount_out, e18(120));
        assert_eq!(vault.buffer(&addr(10)).unwrap(), BufferState::new(e18(100), e18(50)));
    }

    #[test]
    fn test_uninitialized_buffer() {
        let mut vault = vault();
        vault
            .register_wrapped_token(WrappedToken {
                address: addr(11),
                underlying: addr(2),
                total_assets: e18(1),
                total_supply: e18(1),
            })
            .unwrap();

        let res = wrap_or_unwrap(
            &mut vault,
            &addr(11),
            WrappingDirection::Wrap,
            SwapKind::ExactIn,
            &e18(1),
        );

        assert!(matches!(res, Err(RouterError::Vault(_))));
    }

    #[test]
    fn test_dust_conversion_is_too_small() {
        let mut vault = vault();

        let res = wrap_or_unwrap(
            &mut vault,
            &addr(10),
            WrappingDirection::Wrap,
            SwapKind::ExactIn,
            &BigUint::from(9_999u32),
        );

        assert!(matches!(res, Err(RouterError::TradeTooSmall { .. })));
    }
}
