//! Domain error types

use thiserror::Error;

/// Errors raised while building or validating domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A header name is empty or contains forbidden characters.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// The request body could not be encoded as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
