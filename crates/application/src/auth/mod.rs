//! Session management for the admin backend.
//!
//! This module provides:
//! - Persisted credential storage under well-known keys
//! - Single-flight coordination of token refresh cycles
//! - Login, logout and profile lookup

mod refresh;
mod service;
mod session_store;

pub use refresh::{LeaderGuard, RefreshCoordinator, RefreshOutcome, Ticket, Waiter};
pub use service::AuthService;
pub use session_store::{SessionStore, TokenStatus, keys};

/// Login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "user/network-admin/login/";

/// Refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "user/refresh/";

/// Profile of the signed-in operator.
pub const PROFILE_PATH: &str = "user/me/";
