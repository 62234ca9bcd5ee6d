//! Session credentials with expiry tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire::LoginResponse;

/// Access/refresh token pair held for the signed-in operator.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived bearer credential
    pub access_token: String,
    /// Credential used only to mint a new pair
    pub refresh_token: String,
    /// When the access token expires, if the backend said
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Creates credentials from their parts.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Builds credentials from a login response received at `now`.
    #[must_use]
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now + chrono::Duration::seconds(secs));
        Self {
            access_token: response.token,
            refresh_token: response.refresh_token,
            expires_at,
        }
    }

    /// True if the access token is expired, or will be within `buffer_seconds`.
    ///
    /// Credentials without a known expiry never report as expired.
    #[must_use]
    pub fn is_expired_or_expiring(&self, now: DateTime<Utc>, buffer_seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + chrono::Duration::seconds(buffer_seconds) >= expires_at)
    }

    /// Seconds until expiry, or None if no expiry is known.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|exp| (exp - now).num_seconds())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Shortened form of a token for logs (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        token.to_string()
    }
}
