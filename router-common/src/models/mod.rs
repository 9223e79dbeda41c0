pub mod operation;
pub mod path;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{serde_primitives::biguint_string, Bytes};

/// Identity of a token, pool, wrapped asset or account.
///
/// A pool's address is also the address of its pool token.
pub type Address = Bytes;

/// The sentinel address used for the chain's native asset when settling in native asset mode.
pub fn native_asset() -> Address {
    Bytes::zero(20)
}

/// Which side of a trade is fixed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SwapKind {
    /// The input amount is given, the output is calculated.
    ExactIn,
    /// The output amount is given, the input is calculated.
    ExactOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WrappingDirection {
    /// Underlying asset in, wrapped shares out.
    Wrap,
    /// Wrapped shares in, underlying asset out.
    Unwrap,
}

/// Reserves held by the ledger's buffer for a single wrapped asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferState {
    #[serde(with = "biguint_string")]
    pub underlying_balance: BigUint,
    #[serde(with = "biguint_string")]
    pub wrapped_balance: BigUint,
}

impl BufferState {
    pub fn new(underlying_balance: BigUint, wrapped_balance: BigUint) -> Self {
        Self { underlying_balance, wrapped_balance }
    }

    /// Reserve that would be paid out for a conversion in the given direction.
    pub fn outgoing_reserve(&self, direction: WrappingDirection) -> &BigUint {
        match direction {
            WrappingDirection::Wrap => &self.wrapped_balance,
            WrappingDirection::Unwrap => &self.underlying_balance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.underlying_balance.is_zero() && self.wrapped_balance.is_zero()
    }
}
