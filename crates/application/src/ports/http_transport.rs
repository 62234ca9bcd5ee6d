//! HTTP transport port

use std::future::Future;
use std::pin::Pin;

use netadmin_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Transport-level failures. None of these ever trigger a token refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// No connection could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request path could not be turned into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure (TLS, body read, ...).
    #[error("transport error: {0}")]
    Other(String),
}

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>>;

/// Port for sending a single request to the backend.
///
/// Implementations resolve the request path against their base URL and
/// return the response whatever its status; status handling belongs to the
/// caller.
pub trait HttpTransport: Send + Sync {
    /// Sends `request` exactly once.
    fn send(&self, request: &ApiRequest) -> TransportFuture<'_>;
}
