//! Netadmin Application - Client core and ports
//!
//! This crate defines the application layer with:
//! - Port traits (transport, key-value store, clock)
//! - The authenticated client with single-flight token refresh
//! - Session management (login, logout, profile)

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use auth::{AuthService, RefreshCoordinator, SessionStore, TokenStatus};
pub use client::{AuthenticatedClient, RefreshPolicy};
pub use error::{ApiError, ApiResult};
pub use ports::{Clock, HttpTransport, KeyValueStore, StorageError, TransportError};
