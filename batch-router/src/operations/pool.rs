//! Uniform call shape over the ledger's pool primitives.
//!
//! Each function executes one classified step and returns the amount the resolver carries to
//! the next step.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use router_common::{
    errors::VaultError,
    models::{
        operation::{
            AddLiquidityKind, AddLiquidityRequest, RemoveLiquidityKind, RemoveLiquidityRequest,
            SwapRequest,
        },
        Address, SwapKind,
    },
    traits::Vault,
    Bytes,
};
use tracing::trace;

use crate::{errors::RouterError, step::StepContext};

fn token_index<V: Vault>(vault: &V, pool: &Address, token: &Address) -> Result<usize, RouterError> {
    vault
        .pool_tokens(pool)?
        .iter()
        .position(|t| t == token)
        .ok_or_else(|| {
            VaultError::TokenNotInPool { pool: pool.clone(), token: token.clone() }.into()
        })
}

/// Swaps through the step's pool and returns the calculated amount.
///
/// The calculated amount may have been adjusted by a hook. It is accepted only once the change
/// of the router's transient balance in the adjusted token matches it, so a fee or discount the
/// hook promised but did not fund aborts the batch.
pub fn swap<V: Vault>(
    vault: &mut V,
    step: &StepContext,
    kind: SwapKind,
    amount_given: &BigUint,
    limit: Option<BigUint>,
    user_data: &Bytes,
) -> Result<BigUint, RouterError> {
    let adjusted_token = match kind {
        SwapKind::ExactIn => &step.token_out,
        SwapKind::ExactOut => &step.token_in,
    };
    let before = vault.transient_delta(adjusted_token);

    let outcome = vault.swap(&SwapRequest {
        kind,
        pool: step.pool.clone(),
        token_in: step.token_in.clone(),
        token_out: step.token_out.clone(),
        amount_given: amount_given.clone(),
        limit,
        user_data: user_data.clone(),
    })?;

    let moved = vault.transient_delta(adjusted_token) - before;
    let promised = match kind {
        SwapKind::ExactIn => BigInt::from(outcome.amount_calculated.clone()),
        SwapKind::ExactOut => -BigInt::from(outcome.amount_calculated.clone()),
    };
    if let Some(adjustment) = &outcome.hook_adjustment {
        trace!(
            hook = %adjustment.hook,
            promised = %adjustment.promised,
            settled = %adjustment.settled,
            "Hook adjusted step"
        );
    }
    if moved != promised {
        return Err(RouterError::BalanceNotSettled {
            token: adjusted_token.clone(),
            promised,
            settled: moved,
        });
    }
    Ok(outcome.amount_calculated)
}

/// Deposits `amount_in` of the step's input token and returns the pool tokens minted.
pub fn add_liquidity_exact_in<V: Vault>(
    vault: &mut V,
    step: &StepContext,
    amount_in: &BigUint,
    min_pool_tokens_out: Option<BigUint>,
) -> Result<BigUint, RouterError> {
    let index = token_index(vault, &step.pool, &step.token_in)?;
    let mut exact_amounts_in = vec![BigUint::zero(); vault.pool_tokens(&step.pool)?.len()];
    exact_amounts_in[index] = amount_in.clone();
    let outcome = vault.add_liquidity(&AddLiquidityRequest {
        pool: step.pool.clone(),
        kind: AddLiquidityKind::Unbalanced { exact_amounts_in, min_pool_tokens_out },
    })?;
    Ok(outcome.pool_tokens)
}

/// Mints exactly `pool_tokens_out` and returns the amount of the step's input token paid.
pub fn add_liquidity_exact_out<V: Vault>(
    vault: &mut V,
    step: &StepContext,
    pool_tokens_out: &BigUint,
    max_amount_in: Option<BigUint>,
) -> Result<BigUint, RouterError> {
    let index = token_index(vault, &step.pool, &step.token_in)?;
    let outcome = vault.add_liquidity(&AddLiquidityRequest {
        pool: step.pool.clone(),
        kind: AddLiquidityKind::SingleTokenExactOut {
            token: step.token_in.clone(),
            exact_pool_tokens_out: pool_tokens_out.clone(),
            max_amount_in,
        },
    })?;
    Ok(outcome.amounts[index].clone())
}

/// Burns `pool_tokens_in` from the working balance and returns the output token received.
pub fn remove_liquidity_exact_in<V: Vault>(
    vault: &mut V,
    step: &StepContext,
    pool_tokens_in: &BigUint,
    min_amount_out: Option<BigUint>,
) -> Result<BigUint, RouterError> {
    let index = token_index(vault, &step.pool, &step.token_out)?;
    let outcome = vault.remove_liquidity(&RemoveLiquidityRequest {
        pool: step.pool.clone(),
        kind: RemoveLiquidityKind::SingleTokenExactIn {
            exact_pool_tokens_in: pool_tokens_in.clone(),
            token: step.token_out.clone(),
            min_amount_out,
        },
    })?;
    Ok(outcome.amounts[index].clone())
}

/// Withdraws exactly `amount_out` and returns the pool tokens burned from the working balance.
pub fn remove_liquidity_exact_out<V: Vault>(
    vault: &mut V,
    step: &StepContext,
    amount_out: &BigUint,
    max_pool_tokens_in: Option<BigUint>,
) -> Result<BigUint, RouterError> {
    let outcome = vault.remove_liquidity(&RemoveLiquidityRequest {
        pool: step.pool.clone(),
        kind: RemoveLiquidityKind::SingleTokenExactOut {
            token: step.token_out.clone(),
            exact_amount_out: amount_out.clone(),
            max_pool_tokens_in,
        },
    })?;
    Ok(outcome.pool_tokens)
}
