use num_bigint::BigUint;
use router_common::models::{path::Step, Address, SwapKind};

use crate::step::classifier::{classify, StepKind};

/// Everything the resolvers need to know about one step, computed before iteration starts.
///
/// `is_first_step` and `is_last_step` are relative to the resolution direction: under exact out
/// the first step processed is the last one in the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContext {
    pub index: usize,
    pub kind: StepKind,
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub is_first_step: bool,
    pub is_last_step: bool,
}

impl StepContext {
    /// Whether this is the first step of the path in array order.
    pub fn is_path_start(&self) -> bool {
        self.index == 0
    }

    /// Consumes the context, attaching the amounts it resolved to.
    pub fn resolve(self, amount_in: BigUint, amount_out: BigUint) -> ResolvedStep {
        ResolvedStep { context: self, amount_in, amount_out }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    pub context: StepContext,
    pub amount_in: BigUint,
    pub amount_out: BigUint,
}

/// Classifies every step of a path in array order.
pub fn classify_path(token_in: &Address, steps: &[Step], direction: SwapKind) -> Vec<StepContext> {
    let path_len = steps.len();
    let mut current = token_in;
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let is_start = index == 0;
            let is_end = index + 1 == path_len;
            let (is_first_step, is_last_step) = match direction {
                SwapKind::ExactIn => (is_start, is_end),
                SwapKind::ExactOut => (is_end, is_start),
            };
            let context = StepContext {
                index,
                kind: classify(current, step),
                pool: step.pool.clone(),
                token_in: current.clone(),
                token_out: step.token_out.clone(),
                is_first_step,
                is_last_step,
            };
            current = &step.token_out;
            context
        })
        .collect()
}
