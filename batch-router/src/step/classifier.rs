use router_common::models::{path::Step, Address, WrappingDirection};
use strum_macros::Display;

/// Operation a step performs, decided once from the token flowing into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StepKind {
    Swap,
    /// The step mints the pool's own token.
    AddLiquidity,
    /// The step redeems the pool's own token.
    RemoveLiquidity,
    WrapUnwrap(WrappingDirection),
}

/// Classifies a step given the token that flows into it.
///
/// Buffer steps take precedence, then redeeming the pool token, then minting it. Anything else
/// is a plain swap.
pub fn classify(token_in: &Address, step: &Step) -> StepKind {
    if step.is_buffer {
        let direction = if token_in == &step.pool {
            WrappingDirection::Unwrap
        } else {
            WrappingDirection::Wrap
        };
        return StepKind::WrapUnwrap(direction);
    }
    if token_in == &step.pool {
        StepKind::RemoveLiquidity
    } else if step.token_out == step.pool {
        StepKind::AddLiquidity
    } else {
        StepKind::Swap
    }
}
