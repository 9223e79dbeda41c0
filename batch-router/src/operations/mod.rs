//! The two kinds of step execution: buffer conversions and pool operations.

pub mod buffer;
pub mod pool;
