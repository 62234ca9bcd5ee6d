//! Client configuration loaded from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `NETADMIN_API_BASE_URL` | `http://127.0.0.1:8100/api/v1` |
//! | `NETADMIN_REQUEST_TIMEOUT_MS` | `30000` |
//! | `NETADMIN_REFRESH_ON_FORBIDDEN` | `false` |
//! | `NETADMIN_SESSION_FILE` | platform config dir, `netadmin/session.json` |

use std::path::PathBuf;
use std::time::Duration;

use netadmin_application::RefreshPolicy;
use thiserror::Error;
use url::Url;

use crate::persistence::FileKeyValueStore;

/// Local development backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8100/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL did not parse.
    #[error("{key} is not a valid URL: {value}")]
    InvalidUrl {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// A numeric setting did not parse.
    #[error("{key} must be a positive integer, got {value}")]
    InvalidNumber {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// A boolean setting did not parse.
    #[error("{key} must be true or false, got {value}")]
    InvalidBool {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Settings for the authenticated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root every request path is resolved against
    pub base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Treat 403 like 401 and refresh
    pub refresh_on_forbidden: bool,
    /// Explicit session file location
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable if set.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get("NETADMIN_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(raw_url.trim()).map_err(|_| ConfigError::InvalidUrl {
            key: "NETADMIN_API_BASE_URL",
            value: raw_url.clone(),
        })?;

        let request_timeout = match get("NETADMIN_REQUEST_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidNumber {
                    key: "NETADMIN_REQUEST_TIMEOUT_MS",
                    value: raw,
                })?,
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        let refresh_on_forbidden = match get("NETADMIN_REFRESH_ON_FORBIDDEN") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool {
                key: "NETADMIN_REFRESH_ON_FORBIDDEN",
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            base_url,
            request_timeout,
            refresh_on_forbidden,
            session_file: get("NETADMIN_SESSION_FILE").map(PathBuf::from),
        })
    }

    /// Refresh policy implied by this configuration.
    #[must_use]
    pub const fn policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            refresh_on_forbidden: self.refresh_on_forbidden,
        }
    }

    /// Where the session is persisted, if anywhere.
    #[must_use]
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(FileKeyValueStore::default_path)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
