//! Multi-hop batch routing against a shared ledger.
//!
//! A batch is a list of paths. Each path is a chain of steps through pools and wrapping buffers,
//! resolved forward for exact in batches and backward for exact out batches. All paths are
//! resolved before anything is settled, and settlement nets every token across the batch into a
//! single charge and credit against the caller.

pub mod cli;
pub mod composite;
pub mod errors;
pub mod models;
pub mod operations;
pub mod resolver;
pub mod router;
pub mod scenario;
pub mod settlement;
pub mod shadow;
pub mod step;

pub use errors::RouterError;
pub use router::BatchRouter;
