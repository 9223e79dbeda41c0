//! Step classification and per step context.

pub mod classifier;
pub mod context;
pub mod validation;

pub use classifier::{classify, StepKind};
pub use context::{classify_path, ResolvedStep, StepContext};
