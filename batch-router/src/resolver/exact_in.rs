use router_common::{
    models::{operation::LendSource, path::ExactInPath, Address, SwapKind},
    traits::Vault,
    Bytes,
};
use tracing::{debug, instrument};

use crate::{
    errors::RouterError,
    operations::{buffer, pool},
    resolver::PathResolution,
    settlement::SettlementAggregator,
    step::{classify_path, StepKind},
};

/// Resolves an exact in path forwards, feeding each step's output into the next.
///
/// Only the last step carries the path's minimum output as a limit; the realized output is
/// checked against it again once all steps resolved. On success the path input is charged (or,
/// for a path starting with a removal, recorded as taken from the sender's pool tokens) and the
/// output credited.
#[instrument(skip_all, fields(path = path_index, token_in = %path.token_in))]
pub fn resolve<V: Vault>(
    vault: &mut V,
    sender: &Address,
    path_index: usize,
    path: &ExactInPath,
    user_data: &Bytes,
    aggregator: &mut SettlementAggregator,
) -> Result<PathResolution, RouterError> {
    let contexts = classify_path(&path.token_in, &path.steps, SwapKind::ExactIn);
    let starts_with_removal = contexts
        .first()
        .is_some_and(|step| step.kind == StepKind::RemoveLiquidity);

    let mut current = path.exact_amount_in.clone();
    let mut resolved = Vec::with_capacity(contexts.len());
    for step in contexts {
        let limit = step
            .is_last_step
            .then(|| path.min_amount_out.clone());
        let amount_out = match step.kind {
            StepKind::WrapUnwrap(direction) => {
                buffer::wrap_or_unwrap(vault, &step.pool, direction, SwapKind::ExactIn, &current)
                    .map(|outcome| outcome.amount_out)
            }
            StepKind::Swap => {
                pool::swap(vault, &step, SwapKind::ExactIn, &current, limit, user_data)
            }
            StepKind::AddLiquidity => pool::add_liquidity_exact_in(vault, &step, &current, limit),
            StepKind::RemoveLiquidity => {
                let source = if step.is_path_start() {
                    LendSource::Caller(sender.clone())
                } else {
                    LendSource::Ledger
                };
                vault
                    .lend(&step.pool, &current, &source)
                    .map_err(RouterError::from)
                    .and_then(|_| pool::remove_liquidity_exact_in(vault, &step, &current, limit))
            }
        }
        .map_err(|err| err.for_path(path_index))?;

        debug!(
            step = step.index,
            kind = %step.kind,
            pool = %step.pool,
            amount_in = %current,
            %amount_out,
            "Resolved step"
        );
        resolved.push(step.resolve(current, amount_out.clone()));
        current = amount_out;
    }

    if current < path.min_amount_out {
        return Err(RouterError::SwapLimit {
            path: path_index,
            amount: current,
            limit: path.min_amount_out.clone(),
        });
    }

    if starts_with_removal {
        aggregator.record_direct(&path.token_in, &path.exact_amount_in);
    } else {
        aggregator.charge(&path.token_in, &path.exact_amount_in);
    }
    aggregator.credit(path.token_out(), &current);

    Ok(PathResolution { path_amount: current, steps: resolved })
}

