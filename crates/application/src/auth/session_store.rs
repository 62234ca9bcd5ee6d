//! Persisted session credentials.
//!
//! The session lives in a [`KeyValueStore`] under well-known keys so that
//! other parts of the process (or a later run, with a file-backed store)
//! see the same login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use netadmin_domain::{Credentials, RefreshResponse};
use tracing::warn;

use crate::ports::{Clock, KeyValueStore, StorageError};

/// Well-known keys of the persisted session.
pub mod keys {
    /// Access token
    pub const ACCESS_TOKEN: &str = "token";
    /// Refresh token
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// Access token expiry, RFC 3339
    pub const TOKEN_EXPIRY: &str = "tokenExpiry";
    /// Username of the signed-in operator
    pub const USERNAME: &str = "auth_username";
}

/// Seconds before expiry at which a token counts as expiring.
const EXPIRY_BUFFER_SECONDS: i64 = 60;

/// Credential store shared by the client and the surrounding application.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates a session store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
        }
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Stored access token.
    pub async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::ACCESS_TOKEN).await
    }

    /// Stored refresh token.
    pub async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::REFRESH_TOKEN).await
    }

    /// Username recorded at login.
    pub async fn username(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::USERNAME).await
    }

    /// Full credentials, present only when both tokens are stored.
    pub async fn credentials(&self) -> Result<Option<Credentials>, StorageError> {
        let (Some(access_token), Some(refresh_token)) =
            (self.access_token().await?, self.refresh_token().await?)
        else {
            return Ok(None);
        };
        let expires_at = self.expires_at().await?;
        Ok(Some(Credentials {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    /// True when both tokens are stored.
    pub async fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.credentials().await?.is_some())
    }

    /// Persists the credentials issued by a login.
    pub async fn store_login(
        &self,
        credentials: &Credentials,
        username: &str,
    ) -> Result<(), StorageError> {
        self.write_credentials(credentials).await?;
        self.store.set(keys::USERNAME, username).await
    }

    /// Persists the pair returned by the refresh endpoint.
    ///
    /// The stored refresh token and expiry are kept when the response does
    /// not replace them.
    pub async fn store_refreshed(
        &self,
        response: RefreshResponse,
    ) -> Result<Credentials, StorageError> {
        let refresh_token = match response.refresh_token {
            Some(token) => token,
            None => self.refresh_token().await?.unwrap_or_default(),
        };
        let expires_at = match response.expires_in.and_then(|secs| i64::try_from(secs).ok()) {
            Some(secs) => Some(self.clock.now() + chrono::Duration::seconds(secs)),
            None => self.expires_at().await?,
        };
        let credentials = Credentials {
            access_token: response.access_token,
            refresh_token,
            expires_at,
        };
        self.write_credentials(&credentials).await?;
        Ok(credentials)
    }

    /// Wipes the whole store. Safe to call repeatedly.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.clear().await
    }

    /// Token status for display.
    pub async fn status(&self) -> Result<TokenStatus, StorageError> {
        let Some(credentials) = self.credentials().await? else {
            return Ok(TokenStatus::NotAuthenticated);
        };
        let now = self.clock.now();
        let status = if credentials.is_expired_or_expiring(now, 0) {
            TokenStatus::Expired
        } else if credentials.is_expired_or_expiring(now, EXPIRY_BUFFER_SECONDS) {
            TokenStatus::Expiring {
                seconds_remaining: credentials.seconds_until_expiry(now).unwrap_or(0),
            }
        } else {
            TokenStatus::Valid {
                seconds_remaining: credentials.seconds_until_expiry(now),
            }
        };
        Ok(status)
    }

    async fn write_credentials(&self, credentials: &Credentials) -> Result<(), StorageError> {
        self.store
            .set(keys::ACCESS_TOKEN, &credentials.access_token)
            .await?;
        self.store
            .set(keys::REFRESH_TOKEN, &credentials.refresh_token)
            .await?;
        match credentials.expires_at {
            Some(expires_at) => {
                self.store
                    .set(keys::TOKEN_EXPIRY, &expires_at.to_rfc3339())
                    .await
            }
            None => self.store.remove(keys::TOKEN_EXPIRY).await,
        }
    }

    async fn expires_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let Some(raw) = self.store.get(keys::TOKEN_EXPIRY).await? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => Ok(Some(parsed.with_timezone(&Utc))),
            Err(e) => {
                warn!(value = %raw, error = %e, "ignoring unparseable token expiry");
                Ok(None)
            }
        }
    }
}

/// Status of the stored session for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token pair is stored.
    NotAuthenticated,
    /// Token is valid and not expiring soon.
    Valid {
        /// Seconds until expiry, or None if no expiry is known.
        seconds_remaining: Option<i64>,
    },
    /// Token is valid but will expire soon; the next 401 will refresh it.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token has expired.
    Expired,
}

impl TokenStatus {
    /// Returns true if a token pair is stored and not yet expired.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not signed in".to_string(),
            Self::Valid {
                seconds_remaining: Some(secs),
            } => {
                if *secs > 3600 {
                    format!("Valid for {} hours", secs / 3600)
                } else if *secs > 60 {
                    format!("Valid for {} minutes", secs / 60)
                } else {
                    format!("Valid for {secs} seconds")
                }
            }
            Self::Valid {
                seconds_remaining: None,
            } => "Valid (no expiry)".to_string(),
            Self::Expiring { seconds_remaining } => {
                format!("Expiring in {seconds_remaining} seconds")
            }
            Self::Expired => "Expired (will refresh on next request)".to_string(),
        }
    }
}
