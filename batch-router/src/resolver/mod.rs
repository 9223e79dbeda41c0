//! Path resolution in both directions.

pub mod borrow;
pub mod exact_in;
pub mod exact_out;

use num_bigint::BigUint;

use crate::step::ResolvedStep;

/// A fully resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolution {
    /// Realized output for exact in, realized input for exact out.
    pub path_amount: BigUint,
    /// Resolved steps in the order they were processed.
    pub steps: Vec<ResolvedStep>,
}
