//! Yield bearing wrapped assets in the style of ERC4626 vault shares.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{
    errors::VaultError,
    models::{Address, SwapKind, WrappingDirection},
    serde_primitives::biguint_string,
    vault::math::{mul_div_down, mul_div_up},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedToken {
    pub address: Address,
    pub underlying: Address,
    /// Underlying assets held by the wrapper.
    #[serde(with = "biguint_string")]
    pub total_assets: BigUint,
    /// Outstanding shares.
    #[serde(with = "biguint_string")]
    pub total_supply: BigUint,
}

impl WrappedToken {
    fn is_empty(&self) -> bool {
        self.total_assets.is_zero() || self.total_supply.is_zero()
    }

    pub fn to_shares(&self, assets: &BigUint, round_up: bool) -> Result<BigUint, VaultError> {
        if self.is_empty() {
            return Ok(assets.clone());
        }
        if round_up {
            mul_div_up(assets, &self.total_supply, &self.total_assets)
        } else {
            mul_div_down(assets, &self.total_supply, &self.total_assets)
        }
    }

    pub fn to_assets(&self, shares: &BigUint, round_up: bool) -> Result<BigUint, VaultError> {
        if self.is_empty() {
            return Ok(shares.clone());
        }
        if round_up {
            mul_div_up(shares, &self.total_assets, &self.total_supply)
        } else {
            mul_div_down(shares, &self.total_assets, &self.total_supply)
        }
    }

    /// Counter amount of a conversion, rounded in the wrapper's favour.
    pub fn preview(
        &self,
        direction: WrappingDirection,
        kind: SwapKind,
        amount: &BigUint,
    ) -> Result<BigUint, VaultError> {
        match (direction, kind) {
            // deposit
            (WrappingDirection::Wrap, SwapKind::ExactIn) => self.to_shares(amount, false),
            // mint
            (WrappingDirection::Wrap, SwapKind::ExactOut) => self.to_assets(amount, true),
            // redeem
            (WrappingDirection::Unwrap, SwapKind::ExactIn) => self.to_assets(amount, false),
            // withdraw
            (WrappingDirection::Unwrap, SwapKind::ExactOut) => self.to_shares(amount, true),
        }
    }

    /// Moves `assets` into the wrapper and issues `shares`.
    pub fn deposit(&mut self, assets: &BigUint, shares: &BigUint) {
        self.total_assets += assets;
        self.total_supply += shares;
    }

    /// Burns `shares` and releases `assets`.
    pub fn redeem(&mut self, shares: &BigUint, assets: &BigUint) -> Result<(), VaultError> {
        if assets > &self.total_assets || shares > &self.total_supply {
            return Err(VaultError::InsufficientLiquidity {
                token: self.underlying.clone(),
                available: self.total_assets.clone(),
                required: assets.clone(),
            });
        }
        self.total_assets -= assets;
        self.total_supply -= shares;
        Ok(())
    }
}
