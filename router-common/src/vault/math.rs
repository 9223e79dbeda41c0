//! Fixed point helpers for the reference pools. All fees are in basis points.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::errors::VaultError;

pub const BPS: u32 = 10_000;

pub fn div_down(numerator: &BigUint, denominator: &BigUint) -> Result<BigUint, VaultError> {
    if denominator.is_zero() {
        return Err(VaultError::Math("division by zero".to_string()));
    }
    Ok(numerator / denominator)
}

pub fn div_up(numerator: &BigUint, denominator: &BigUint) -> Result<BigUint, VaultError> {
    if denominator.is_zero() {
        return Err(VaultError::Math("division by zero".to_string()));
    }
    if numerator.is_zero() {
        return Ok(BigUint::zero());
    }
    Ok((numerator - BigUint::one()) / denominator + BigUint::one())
}

pub fn mul_div_down(
    a: &BigUint,
    b: &BigUint,
    denominator: &BigUint,
) -> Result<BigUint, VaultError> {
    div_down(&(a * b), denominator)
}

pub fn mul_div_up(a: &BigUint, b: &BigUint, denominator: &BigUint) -> Result<BigUint, VaultError> {
    div_up(&(a * b), denominator)
}

/// Amount left after taking the fee, rounded down.
pub fn apply_fee(amount: &BigUint, fee_bps: u32) -> BigUint {
    amount * BigUint::from(BPS - fee_bps) / BigUint::from(BPS)
}

/// Smallest amount that still covers `amount` once the fee is taken.
pub fn gross_up(amount: &BigUint, fee_bps: u32) -> Result<BigUint, VaultError> {
    mul_div_up(amount, &BigUint::from(BPS), &BigUint::from(BPS - fee_bps))
}

/// `value * bps / 10_000`, rounded down.
pub fn bps_of(value: &BigUint, bps: u32) -> BigUint {
    value * BigUint::from(bps) / BigUint::from(BPS)
}
