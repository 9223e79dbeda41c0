//! Caller supplied paths and the steps they are made of.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{models::Address, serde_primitives::biguint_string};

/// One hop of a path.
///
/// `pool` is either a pool or, when `is_buffer` is set, the wrapped asset whose buffer converts
/// between it and its underlying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub pool: Address,
    pub token_out: Address,
    #[serde(default)]
    pub is_buffer: bool,
}

impl Step {
    pub fn new(pool: Address, token_out: Address, is_buffer: bool) -> Self {
        Self { pool, token_out, is_buffer }
    }

    pub fn pool(pool: Address, token_out: Address) -> Self {
        Self::new(pool, token_out, false)
    }

    pub fn buffer(wrapped: Address, token_out: Address) -> Self {
        Self::new(wrapped, token_out, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInPath {
    pub token_in: Address,
    pub steps: Vec<Step>,
    #[serde(with = "biguint_string")]
    pub exact_amount_in: BigUint,
    #[serde(with = "biguint_string")]
    pub min_amount_out: BigUint,
}

impl ExactInPath {
    pub fn new(
        token_in: Address,
        steps: Vec<Step>,
        exact_amount_in: BigUint,
        min_amount_out: BigUint,
    ) -> Self {
        Self { token_in, steps, exact_amount_in, min_amount_out }
    }

    /// The token the path finally delivers, `token_in` if there are no steps.
    pub fn token_out(&self) -> &Address {
        self.steps
            .last()
            .map(|step| &step.token_out)
            .unwrap_or(&self.token_in)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutPath {
    pub token_in: Address,
    pub steps: Vec<Step>,
    #[serde(with = "biguint_string")]
    pub exact_amount_out: BigUint,
    #[serde(with = "biguint_string")]
    pub max_amount_in: BigUint,
}

impl ExactOutPath {
    pub fn new(
        token_in: Address,
        steps: Vec<Step>,
        exact_amount_out: BigUint,
        max_amount_in: BigUint,
    ) -> Self {
        Self { token_in, steps, exact_amount_out, max_amount_in }
    }

    pub fn token_out(&self) -> &Address {
        self.steps
            .last()
            .map(|step| &step.token_out)
            .unwrap_or(&self.token_in)
    }
}
