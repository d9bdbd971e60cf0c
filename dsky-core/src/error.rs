//! Error types for the DSKY console.
//!
//! The interpreter tick itself never fails; these cover the fallible edges
//! around it, such as loading configuration.

use thiserror::Error;

/// Errors that can occur outside the interpreter tick.
#[derive(Error, Debug)]
pub enum DskyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for DSKY operations.
pub type DskyResult<T> = Result<T, DskyError>;
