pub mod config;
pub mod errors;
pub mod hex_bytes;
pub mod models;
pub mod serde_primitives;
pub mod traits;
pub mod vault;

pub use hex_bytes::Bytes;
