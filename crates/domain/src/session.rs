//! Session lifecycle events.
//!
//! Consumers (a dashboard shell, a CLI probe) subscribe to these to react
//! when the operator must sign in again.

use serde::Serialize;

/// Why a session was forcibly reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResetReason {
    /// An authorization failure occurred with no refresh token stored.
    MissingRefreshToken,
    /// The refresh endpoint rejected the refresh token or could not be reached.
    RefreshFailed {
        /// Failure description
        message: String,
    },
    /// A caller asked for the reset.
    Requested,
}

impl std::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRefreshToken => f.write_str("no refresh token available"),
            Self::RefreshFailed { message } => write!(f, "token refresh failed: {message}"),
            Self::Requested => f.write_str("session reset requested"),
        }
    }
}

/// Events emitted as the session changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Credentials were stored after a successful login.
    LoggedIn {
        /// Operator username
        username: String,
    },
    /// A refresh cycle stored a new token pair.
    TokenRefreshed {
        /// Preview of the new access token
        token_preview: String,
    },
    /// Credentials were wiped; the operator must go back to the login entry point.
    SessionReset {
        /// What forced the reset
        reason: ResetReason,
    },
    /// The operator logged out.
    LoggedOut,
}

impl SessionEvent {
    /// True for events after which the operator has to sign in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::SessionReset { .. } | Self::LoggedOut)
    }
}
