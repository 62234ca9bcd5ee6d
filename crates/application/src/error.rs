//! Client error taxonomy

use netadmin_domain::{ApiResponse, DomainError, ResetReason};
use thiserror::Error;

use crate::ports::{StorageError, TransportError};

/// Errors surfaced by the authenticated client.
///
/// Only authorization failures are intercepted by the client; every other
/// non-success response is returned here with its original status and body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before a response was received.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The backend rejected the credentials, and refreshing could not help.
    #[error("not authorized (HTTP {})", response.status)]
    Authorization {
        /// The rejecting response
        response: ApiResponse,
    },

    /// The session could not be recovered and has been reset.
    #[error("session expired: {reason}")]
    SessionExpired {
        /// What forced the reset
        reason: ResetReason,
    },

    /// The backend rejected the request (4xx other than authorization).
    #[error("request rejected (HTTP {}): {}", response.status, response.text())]
    Validation {
        /// The rejecting response
        response: ApiResponse,
    },

    /// The backend failed to handle the request (5xx and other statuses).
    #[error("server error (HTTP {})", response.status)]
    Server {
        /// The failing response
        response: ApiResponse,
    },

    /// A success response did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// Session state could not be read or written.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status behind this error, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authorization { response }
            | Self::Validation { response }
            | Self::Server { response } => Some(response.status),
            _ => None,
        }
    }

    /// True if the operator has to sign in again.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Maps a non-success response onto the taxonomy.
    #[must_use]
    pub fn from_response(response: ApiResponse) -> Self {
        if matches!(response.status, 401 | 403) {
            Self::Authorization { response }
        } else if response.is_client_error() {
            Self::Validation { response }
        } else {
            Self::Server { response }
        }
    }
}

/// Result type alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
