//! Request and response bodies of the login and refresh endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST user/network-admin/login/`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Operator username
    pub username: String,
    /// Operator password
    pub password: String,
}

impl LoginRequest {
    /// Creates a login body.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Access token
    pub token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Body of `POST user/refresh/`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    /// Stored refresh token
    pub refresh_token: &'a str,
}

/// Successful refresh reply.
///
/// Backends that do not rotate refresh tokens may omit `refresh_token`; the
/// stored one is then kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,
    /// Rotated refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// New access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}
