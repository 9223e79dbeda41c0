use num_bigint::BigUint;
use router_common::{
    models::{operation::LendSource, path::ExactOutPath, SwapKind},
    traits::Vault,
    Bytes,
};
use tracing::{debug, instrument, trace};

use crate::{
    errors::RouterError,
    operations::{buffer, pool},
    resolver::{borrow::BorrowTicket, PathResolution},
    settlement::SettlementAggregator,
    step::{classify_path, StepContext, StepKind},
};

/// Resolves an exact out path backwards, asking each step for the input it needs to produce
/// what the following step requires.
///
/// Only the path's first step (processed last) carries `max_amount_in` as a limit. Liquidity
/// removals burn pool tokens lent by the ledger, so a path that starts with a removal pays only
/// what was consumed, charged once at settlement. Removals that are not processed first go
/// through a [`BorrowTicket`]; every ticket must be settled before the path counts as resolved.
#[instrument(skip_all, fields(path = path_index, token_in = %path.token_in))]
pub fn resolve<V: Vault>(
    vault: &mut V,
    path_index: usize,
    path: &ExactOutPath,
    user_data: &Bytes,
    aggregator: &mut SettlementAggregator,
) -> Result<PathResolution, RouterError> {
    let contexts = classify_path(&path.token_in, &path.steps, SwapKind::ExactOut);
    let mut current = path.exact_amount_out.clone();
    let mut resolved = Vec::with_capacity(contexts.len());
    let mut tickets = Vec::new();
    for step in contexts.into_iter().rev() {
        let limit = step
            .is_last_step
            .then(|| path.max_amount_in.clone());
        let amount_in = match step.kind {
            StepKind::WrapUnwrap(direction) => {
                buffer::wrap_or_unwrap(vault, &step.pool, direction, SwapKind::ExactOut, &current)
                    .map(|outcome| outcome.amount_in)
            }
            StepKind::Swap => {
                pool::swap(vault, &step, SwapKind::ExactOut, &current, limit, user_data)
            }
            StepKind::AddLiquidity => pool::add_liquidity_exact_out(vault, &step, &current, limit),
            StepKind::RemoveLiquidity if step.is_first_step => {
                remove_directly(vault, &step, &current, limit)
            }
            StepKind::RemoveLiquidity => {
                let mut ticket = BorrowTicket::new(step.pool.clone(), LendSource::Ledger);
                let consumed = remove_with_borrow(vault, &mut ticket, &step, &current, limit);
                tickets.push(ticket);
                consumed
            }
        }
        .map_err(|err| err.for_path(path_index))?;

        debug!(
            step = step.index,
            kind = %step.kind,
            pool = %step.pool,
            %amount_in,
            amount_out = %current,
            "Resolved step"
        );
        resolved.push(step.resolve(amount_in.clone(), current));
        current = amount_in;
    }

    for ticket in &tickets {
        ticket
            .ensure_settled()
            .map_err(|err| err.for_path(path_index))?;
    }
    if current > path.max_amount_in {
        return Err(RouterError::SwapLimit {
            path: path_index,
            amount: current,
            limit: path.max_amount_in.clone(),
        });
    }

    aggregator.credit(path.token_out(), &path.exact_amount_out);
    aggregator.charge(&path.token_in, &current);

    Ok(PathResolution { path_amount: current, steps: resolved })
}

/// Removal processed first: the amount out is known up front, so the exact burn is previewed
/// and lent without a borrow.
fn remove_directly<V: Vault>(
    vault: &mut V,
    step: &StepContext,
    amount_out: &BigUint,
    limit: Option<BigUint>,
) -> Result<BigUint, RouterError> {
    let required = vault.query_remove_liquidity_single_token_exact_out(
        &step.pool,
        &step.token_out,
        amount_out,
    )?;
    if let Some(limit) = limit {
        if required > limit {
            return Err(RouterError::AmountInAboveMax {
                token: step.pool.clone(),
                amount: required,
                limit,
            });
        }
    }
    vault.lend(&step.pool, &required, &LendSource::Ledger)?;
    pool::remove_liquidity_exact_out(vault, step, amount_out, Some(required))
}

/// Removal processed after other steps: borrow up to the bound, burn what the removal needs,
/// refund the rest.
///
/// The bound is whatever the ledger can lend, capped by the path's `max_amount_in` for a path
/// initial removal.
fn remove_with_borrow<V: Vault>(
    vault: &mut V,
    ticket: &mut BorrowTicket,
    step: &StepContext,
    amount_out: &BigUint,
    limit: Option<BigUint>,
) -> Result<BigUint, RouterError> {
    let lendable = vault.lendable(&step.pool);
    let bound = match limit {
        Some(max_amount_in) => max_amount_in.min(lendable),
        None => lendable,
    };
    let borrowed = ticket.borrow(vault, bound)?;
    let consumed = pool::remove_liquidity_exact_out(vault, step, amount_out, Some(borrowed))?;
    let refund = ticket.reconcile(vault, &consumed)?;
    trace!(pool = %step.pool, %consumed, %refund, "Removal reconciled");
    Ok(consumed)
}
