//! Error types for the fnshim adapter.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type ShimResult<T> = Result<T, ShimError>;

/// Errors that can occur inside the adapter.
///
/// Only [`ShimError::Body`], [`ShimError::Config`] and
/// [`ShimError::Unavailable`] are ever returned to callers. The channel
/// variants are recorded on the diagnostic channel and dropped by the
/// pipeline, which always finishes with a response.
#[derive(Debug, Error)]
pub enum ShimError {
    #[error("failed to read input channel: {0}")]
    InputRead(#[source] std::io::Error),

    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write output channel: {0}")]
    OutputWrite(#[source] std::io::Error),

    #[error("request body mismatch: {0}")]
    Body(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} is not available in this runtime")]
    Unavailable(&'static str),
}
