//! Netadmin Domain - Core types
//!
//! This crate defines the domain model of the network-admin API client:
//! requests and responses, session credentials, the login/refresh wire
//! formats and session events. All types here are pure Rust with no I/O.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;
pub mod session;

pub use auth::{
    Credentials, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserProfile,
    token_preview,
};
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, Header, Headers, HttpMethod};
pub use response::ApiResponse;
pub use session::{ResetReason, SessionEvent};
