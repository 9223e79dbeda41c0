use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::serde_primitives::biguint_string;

const DEFAULT_MINIMUM_TRADE_AMOUNT: u64 = 1_000_000;
const DEFAULT_MINIMUM_WRAP_AMOUNT: u64 = 10_000;

/// Trade size policies enforced by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Smallest swap amount, given or calculated, and smallest non-zero liquidity amount.
    #[serde(with = "biguint_string", default = "default_minimum_trade_amount")]
    pub minimum_trade_amount: BigUint,
    /// Smallest amount a buffer or wrapper will convert.
    #[serde(with = "biguint_string", default = "default_minimum_wrap_amount")]
    pub minimum_wrap_amount: BigUint,
}

fn default_minimum_trade_amount() -> BigUint {
    BigUint::from(DEFAULT_MINIMUM_TRADE_AMOUNT)
}

fn default_minimum_wrap_amount() -> BigUint {
    BigUint::from(DEFAULT_MINIMUM_WRAP_AMOUNT)
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            minimum_trade_amount: default_minimum_trade_amount(),
            minimum_wrap_amount: default_minimum_wrap_amount(),
        }
    }
}
