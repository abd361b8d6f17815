//! Error types for the handlerkit crate

use thiserror::Error;

/// Errors that can occur while encoding continuations or driving a handler
#[derive(Error, Debug)]
pub enum Error {
    /// Continuation could not be serialized or parsed
    #[error("continuation error: {0}")]
    Continuation(#[from] serde_json::Error),

    /// Continuation was written by an incompatible version
    #[error("unsupported continuation version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Handler kept returning IN_PROGRESS past the invocation budget
    #[error("operation still in progress after {limit} invocations")]
    InvocationLimit { limit: u32 },

    /// In-progress event came back without a continuation
    #[error("in-progress event is missing its continuation")]
    MissingContinuation,
}

/// Result type for handlerkit operations
pub type Result<T> = std::result::Result<T, Error>;
