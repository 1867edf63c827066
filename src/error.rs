//! Safegate error types

use thiserror::Error;

/// Safegate error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (bad threshold, uncompilable pattern, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Detector runtime fault. Contained by the pipeline and mapped to a
    /// `Blocked` (required stage) or `Skipped` (optional stage) verdict;
    /// never escapes a `validate_input`/`validate_output` call.
    #[error("Detector error: {0}")]
    Detector(String),

    /// Admission-gate refusal, raised before the pipeline runs at all
    #[error("Rate limit exceeded for key '{key}'")]
    RateLimited {
        /// Caller identity whose window is exhausted
        key: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for safegate operations
pub type Result<T> = std::result::Result<T, Error>;
