//! Login, logout and profile lookup on top of the authenticated client.

use netadmin_domain::{
    ApiRequest, Credentials, LoginRequest, LoginResponse, ResetReason, SessionEvent, UserProfile,
};
use tracing::{info, warn};

use super::{LOGIN_PATH, PROFILE_PATH, TokenStatus};
use crate::client::AuthenticatedClient;
use crate::error::{ApiError, ApiResult};

/// Session entry points used by the dashboard shell.
#[derive(Clone)]
pub struct AuthService {
    client: AuthenticatedClient,
}

impl AuthService {
    /// Creates the service around `client`.
    #[must_use]
    pub const fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// The underlying authenticated client.
    #[must_use]
    pub const fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Signs in and persists the issued credentials.
    ///
    /// The login call is never authenticated and never refreshed; a
    /// rejection leaves any stored session untouched.
    ///
    /// # Errors
    ///
    /// `ApiError::Authorization` for bad credentials, `ApiError::Decode` if
    /// the reply lacks the token pair, plus the usual transport and storage
    /// errors.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Credentials> {
        let request =
            ApiRequest::post(LOGIN_PATH).with_json(&LoginRequest::new(username, password))?;
        let response = self.client.send_unauthenticated(&request).await?;
        if !response.is_success() {
            warn!(username, status = response.status, "login rejected");
            return Err(ApiError::from_response(response));
        }
        let reply: LoginResponse = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let session = self.client.session();
        let credentials = Credentials::from_login(reply, session.now());
        session.store_login(&credentials, username).await?;
        info!(username, "logged in");
        self.client.emit(SessionEvent::LoggedIn {
            username: username.to_string(),
        });
        Ok(credentials)
    }

    /// Signs out, wiping the stored session. Safe to call when signed out.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be cleared.
    pub async fn logout(&self) -> ApiResult<()> {
        self.client.session().clear().await?;
        info!("logged out");
        self.client.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Forces the operator back to the login entry point.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be cleared.
    pub async fn reset_session(&self) -> ApiResult<()> {
        self.client.reset_session(ResetReason::Requested).await
    }

    /// Fetches the signed-in operator's profile.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::request`].
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.client.get_json(PROFILE_PATH).await
    }

    /// True when a token pair is stored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be read.
    pub async fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.client.session().is_authenticated().await?)
    }

    /// Username recorded at login.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be read.
    pub async fn username(&self) -> ApiResult<Option<String>> {
        Ok(self.client.session().username().await?)
    }

    /// Stored token status for display.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be read.
    pub async fn status(&self) -> ApiResult<TokenStatus> {
        Ok(self.client.session().status().await?)
    }
}
