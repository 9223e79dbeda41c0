//! Checks run before any step touches the ledger.

use num_bigint::BigUint;
use num_traits::Zero;
use router_common::{
    models::{path::Step, Address},
    traits::BufferOperations,
};

use crate::errors::RouterError;

/// Validates one path: it must have steps, a non-zero exact amount, and every buffer step must
/// pair a wrapped token with its own underlying.
pub fn validate_path<V: BufferOperations>(
    vault: &V,
    path_index: usize,
    token_in: &Address,
    steps: &[Step],
    exact_amount: &BigUint,
) -> Result<(), RouterError> {
    if steps.is_empty() {
        return Err(RouterError::InvalidConfiguration(format!("path {path_index} has no steps")));
    }
    if exact_amount.is_zero() {
        return Err(RouterError::InvalidConfiguration(format!(
            "path {path_index} has a zero exact amount"
        )));
    }
    let mut current = token_in;
    for (index, step) in steps.iter().enumerate() {
        if &step.token_out == current {
            return Err(RouterError::InvalidConfiguration(format!(
                "path {path_index} step {index} converts {current} into itself"
            )));
        }
        if step.is_buffer {
            validate_buffer_step(vault, current, step).map_err(|reason| {
                RouterError::InvalidConfiguration(format!(
                    "path {path_index} step {index}: {reason}"
                ))
            })?;
        }
        current = &step.token_out;
    }
    Ok(())
}

fn validate_buffer_step<V: BufferOperations>(
    vault: &V,
    token_in: &Address,
    step: &Step,
) -> Result<(), String> {
    let underlying = vault
        .underlying_of(&step.pool)
        .ok_or_else(|| format!("{} is not a registered wrapped token", step.pool))?;
    let wraps = token_in == &underlying && step.token_out == step.pool;
    let unwraps = token_in == &step.pool && step.token_out == underlying;
    if !(wraps || unwraps) {
        return Err(format!(
            "buffer {} converts between itself and {underlying}, not {token_in} and {}",
            step.pool, step.token_out
        ));
    }
    Ok(())
}
