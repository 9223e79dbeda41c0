//! Reference swap hooks.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{
    errors::VaultError,
    models::{Address, SwapKind},
    traits::{AfterSwapParams, SwapHook},
    vault::math::bps_of,
};

/// A hook bound to a pool together with the ledger account that collects its fees and funds
/// its discounts.
#[derive(Debug, Clone)]
pub struct PoolHook {
    pub account: Address,
    pub hook: Box<dyn SwapHook>,
}

/// Charges the swapper a fee proportional to the calculated amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeTakingHook {
    pub fee_bps: u32,
}

impl SwapHook for FeeTakingHook {
    fn on_after_swap(&self, params: &AfterSwapParams<'_>) -> Result<BigUint, VaultError> {
        let fee = bps_of(params.amount_calculated, self.fee_bps);
        Ok(match params.kind {
            SwapKind::ExactIn => params.amount_calculated - fee,
            SwapKind::ExactOut => params.amount_calculated + fee,
        })
    }

    fn clone_box(&self) -> Box<dyn SwapHook> {
        Box::new(self.clone())
    }
}

/// Improves the swapper's price, funding the difference from the hook account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountHook {
    pub discount_bps: u32,
}

impl SwapHook for DiscountHook {
    fn on_after_swap(&self, params: &AfterSwapParams<'_>) -> Result<BigUint, VaultError> {
        let discount = bps_of(params.amount_calculated, self.discount_bps);
        Ok(match params.kind {
            SwapKind::ExactIn => params.amount_calculated + discount,
            SwapKind::ExactOut => params.amount_calculated - discount,
        })
    }

    fn clone_box(&self) -> Box<dyn SwapHook> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookKind {
    Fee { fee_bps: u32 },
    Discount { discount_bps: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    pub account: Address,
    #[serde(flatten)]
    pub kind: HookKind,
}

impl HookConfig {
    pub fn build(&self) -> Result<PoolHook, VaultError> {
        let hook: Box<dyn SwapHook> = match self.kind {
            HookKind::Fee { fee_bps } if fee_bps < 10_000 => Box::new(FeeTakingHook { fee_bps }),
            HookKind::Discount { discount_bps } if discount_bps < 10_000 => {
                Box::new(DiscountHook { discount_bps })
            }
            _ => {
                return Err(VaultError::InvalidConfiguration(format!(
                    "hook percentage out of range: {:?}",
                    self.kind
                )))
            }
        };
        Ok(PoolHook { account: self.account.clone(), hook })
    }
}
