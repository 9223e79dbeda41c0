//! Reference pool math.
//!
//! Two invariants are supported: constant sum (`Linear`, every token trades 1:1) and constant
//! product over two tokens where the invariant is `sqrt(x * y)`. Liquidity operations price pool
//! tokens proportionally to the invariant growth, `bpt = supply * (I' - I) / I`. Rounding always
//! favours the pool.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    errors::VaultError,
    models::{Address, SwapKind},
    vault::{
        hooks::PoolHook,
        math::{apply_fee, div_up, gross_up, mul_div_down, mul_div_up},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Linear,
    ConstantProduct,
}

#[derive(Debug, Clone)]
pub struct Pool {
    pub address: Address,
    pub kind: PoolKind,
    pub tokens: Vec<Address>,
    pub balances: Vec<BigUint>,
    pub total_supply: BigUint,
    pub fee_bps: u32,
    pub hook: Option<PoolHook>,
}

impl Pool {
    pub fn token_index(&self, token: &Address) -> Result<usize, VaultError> {
        self.tokens
            .iter()
            .position(|t| t == token)
            .ok_or_else(|| VaultError::TokenNotInPool {
                pool: self.address.clone(),
                token: token.clone(),
            })
    }

    pub fn invariant(&self, balances: &[BigUint]) -> BigUint {
        match self.kind {
            PoolKind::Linear => balances.iter().sum(),
            PoolKind::ConstantProduct => balances
                .iter()
                .product::<BigUint>()
                .sqrt(),
        }
    }

    /// Smallest balance of token `index` that keeps the invariant at or above `target`.
    fn balance_for_invariant(
        &self,
        balances: &[BigUint],
        index: usize,
        target: &BigUint,
    ) -> Result<BigUint, VaultError> {
        match self.kind {
            PoolKind::Linear => {
                let others: BigUint = balances
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, b)| b)
                    .sum();
                if &others > target {
                    return Ok(BigUint::zero());
                }
                Ok(target - others)
            }
            PoolKind::ConstantProduct => {
                let other = &balances[1 - index];
                div_up(&(target * target), other)
            }
        }
    }

    fn current_invariant(&self) -> Result<BigUint, VaultError> {
        let invariant = self.invariant(&self.balances);
        if invariant.is_zero() || self.total_supply.is_zero() {
            return Err(VaultError::Math(format!("pool {} has no liquidity", self.address)));
        }
        Ok(invariant)
    }

    fn ensure_available(&self, index: usize, required: &BigUint) -> Result<(), VaultError> {
        let available = &self.balances[index];
        if required >= available {
            return Err(VaultError::InsufficientLiquidity {
                token: self.tokens[index].clone(),
                available: available.clone(),
                required: required.clone(),
            });
        }
        Ok(())
    }

    /// Raw swap result before hooks: the output for `ExactIn`, the input for `ExactOut`.
    pub fn compute_swap(
        &self,
        kind: SwapKind,
        index_in: usize,
        index_out: usize,
        amount_given: &BigUint,
    ) -> Result<BigUint, VaultError> {
        match (self.kind, kind) {
            (PoolKind::Linear, SwapKind::ExactIn) => {
                let amount_out = apply_fee(amount_given, self.fee_bps);
                self.ensure_available(index_out, &amount_out)?;
                Ok(amount_out)
            }
            (PoolKind::Linear, SwapKind::ExactOut) => {
                self.ensure_available(index_out, amount_given)?;
                gross_up(amount_given, self.fee_bps)
            }
            (PoolKind::ConstantProduct, SwapKind::ExactIn) => {
                let x = &self.balances[index_in];
                let y = &self.balances[index_out];
                let amount_in_net = apply_fee(amount_given, self.fee_bps);
                mul_div_down(y, &amount_in_net, &(x + &amount_in_net))
            }
            (PoolKind::ConstantProduct, SwapKind::ExactOut) => {
                self.ensure_available(index_out, amount_given)?;
                let x = &self.balances[index_in];
                let y = &self.balances[index_out];
                let amount_in_net = mul_div_up(x, amount_given, &(y - amount_given))?;
                gross_up(&amount_in_net, self.fee_bps)
            }
        }
    }

    /// Pool tokens minted for depositing `amounts_in` (pool token order).
    pub fn compute_add_unbalanced(&self, amounts_in: &[BigUint]) -> Result<BigUint, VaultError> {
        if amounts_in.len() != self.tokens.len() {
            return Err(VaultError::InvalidConfiguration(format!(
                "pool {} expects {} amounts, got {}",
                self.address,
                self.tokens.len(),
                amounts_in.len()
            )));
        }
        let invariant = self.current_invariant()?;
        let new_balances: Vec<BigUint> = self
            .balances
            .iter()
            .zip(amounts_in)
            .map(|(balance, amount)| balance + apply_fee(amount, self.fee_bps))
            .collect();
        let new_invariant = self.invariant(&new_balances);
        mul_div_down(&self.total_supply, &(new_invariant - &invariant), &invariant)
    }

    /// Amount of token `index` required to mint exactly `pool_tokens_out`.
    pub fn compute_add_single_token_exact_out(
        &self,
        index: usize,
        pool_tokens_out: &BigUint,
    ) -> Result<BigUint, VaultError> {
        let invariant = self.current_invariant()?;
        let new_invariant =
            mul_div_up(&invariant, &(&self.total_supply + pool_tokens_out), &self.total_supply)?;
        let new_balance = self.balance_for_invariant(&self.balances, index, &new_invariant)?;
        let balance = &self.balances[index];
        if &new_balance <= balance {
            return Ok(BigUint::zero());
        }
        gross_up(&(new_balance - balance), self.fee_bps)
    }

    /// Amount of token `index` paid out for burning exactly `pool_tokens_in`.
    pub fn compute_remove_single_token_exact_in(
        &self,
        index: usize,
        pool_tokens_in: &BigUint,
    ) -> Result<BigUint, VaultError> {
        if pool_tokens_in > &self.total_supply {
            return Err(VaultError::InsufficientLiquidity {
                token: self.address.clone(),
                available: self.total_supply.clone(),
                required: pool_tokens_in.clone(),
            });
        }
        let invariant = self.current_invariant()?;
        let new_invariant =
            mul_div_up(&invariant, &(&self.total_supply - pool_tokens_in), &self.total_supply)?;
        let new_balance = self.balance_for_invariant(&self.balances, index, &new_invariant)?;
        let balance = &self.balances[index];
        if &new_balance >= balance {
            return Ok(BigUint::zero());
        }
        Ok(apply_fee(&(balance - new_balance), self.fee_bps))
    }

    /// Pool tokens burned to pay out exactly `amount_out` of token `index`.
    pub fn compute_remove_single_token_exact_out(
        &self,
        index: usize,
        amount_out: &BigUint,
    ) -> Result<BigUint, VaultError> {
        let invariant = self.current_invariant()?;
        let gross = gross_up(amount_out, self.fee_bps)?;
        self.ensure_available(index, &gross)?;
        let mut new_balances = self.balances.clone();
        new_balances[index] -= &gross;
        let new_invariant = self.invariant(&new_balances);
        let pool_tokens_in =
            mul_div_up(&self.total_supply, &(&invariant - &new_invariant), &invariant)?;
        if pool_tokens_in > self.total_supply {
            return Err(VaultError::InsufficientLiquidity {
                token: self.address.clone(),
                available: self.total_supply.clone(),
                required: pool_tokens_in,
            });
        }
        Ok(pool_tokens_in)
    }

    pub fn compute_remove_proportional(
        &self,
        pool_tokens_in: &BigUint,
    ) -> Result<Vec<BigUint>, VaultError> {
        if pool_tokens_in > &self.total_supply {
            return Err(VaultError::InsufficientLiquidity {
                token: self.address.clone(),
                available: self.total_supply.clone(),
                required: pool_tokens_in.clone(),
            });
        }
        self.balances
            .iter()
            .map(|balance| mul_div_down(balance, pool_tokens_in, &self.total_supply))
            .collect()
    }
}
