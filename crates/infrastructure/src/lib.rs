//! Netadmin Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration and
//! logging setup for binaries.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::{ReqwestTransport, SystemClock};
pub use bootstrap::{build_auth_service, build_client, session_backend};
pub use config::{ClientConfig, ConfigError};
pub use persistence::{FileKeyValueStore, MemoryKeyValueStore};
pub use telemetry::init_tracing;
