//! Error types for core primitives.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid hash format or value.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// Hex decode error.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}
