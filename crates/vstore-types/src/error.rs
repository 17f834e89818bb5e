use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid apiVersion {0:?}: expected \"<group>/<version>\"")]
    InvalidApiVersion(String),

    #[error("apiVersion group {found:?} does not match {expected:?}")]
    GroupMismatch { expected: String, found: String },
}

/// Why an operation stopped before completing.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}
