//! Bearer-authenticated client with transparent token refresh.
//!
//! Requests carry the stored access token. When the backend answers with an
//! authorization failure the client joins the shared refresh cycle, replays
//! the request once with the new token and returns that result. If the
//! session cannot be recovered the store is wiped and a
//! [`SessionEvent::SessionReset`] is broadcast.

use std::sync::Arc;

use netadmin_domain::{
    ApiRequest, ApiResponse, RefreshRequest, RefreshResponse, ResetReason, SessionEvent,
    token_preview,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::auth::{REFRESH_PATH, RefreshCoordinator, SessionStore, Ticket};
use crate::error::{ApiError, ApiResult};
use crate::ports::HttpTransport;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 32;

/// Which statuses count as an expired session.
///
/// 401 always does. 403 usually means "authenticated but not allowed",
/// which no refresh can fix, so it only triggers a refresh for backends
/// known to answer expired tokens with 403.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Treat 403 like 401.
    pub refresh_on_forbidden: bool,
}

impl RefreshPolicy {
    /// True if `status` should start (or join) a refresh cycle.
    #[must_use]
    pub const fn triggers_refresh(self, status: u16) -> bool {
        status == 401 || (self.refresh_on_forbidden && status == 403)
    }
}

/// HTTP client that attaches and refreshes the session's bearer token.
///
/// Clones share the transport, the session store, the refresh cycle and the
/// event channel.
#[derive(Clone)]
pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    refresh: Arc<RefreshCoordinator>,
    events: broadcast::Sender<SessionEvent>,
    policy: RefreshPolicy,
}

impl AuthenticatedClient {
    /// Creates a client over `transport` using `session` for credentials.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, session: SessionStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            session,
            refresh: Arc::new(RefreshCoordinator::new()),
            events,
            policy: RefreshPolicy::default(),
        }
    }

    /// Replaces the refresh policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Subscribes to session events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The session store this client reads and writes.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The refresh cycle shared by all clones.
    #[must_use]
    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Active refresh policy.
    #[must_use]
    pub const fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Sends `request` with the stored access token, refreshing it once if
    /// the backend rejects it.
    ///
    /// # Errors
    ///
    /// - `ApiError::Network` on transport failure (never retried)
    /// - `ApiError::SessionExpired` if the session could not be refreshed
    /// - `ApiError::Authorization` if the replay was rejected as well
    /// - `ApiError::Validation` / `ApiError::Server` for other failures,
    ///   carrying the original response
    pub async fn request(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let sent_token = self.session.access_token().await?;
        let response = self.send_with(&request, sent_token.as_deref()).await?;
        if !self.policy.triggers_refresh(response.status) {
            return classify(response);
        }
        if request.is_retry() {
            return Err(ApiError::Authorization { response });
        }

        let replay = request.retried();
        let token = self.recover(sent_token.as_deref()).await?;
        debug!(request_id = %replay.id(), path = replay.path(), "replaying with refreshed token");
        let response = self.send_with(&replay, Some(&token)).await?;
        if self.policy.triggers_refresh(response.status) {
            warn!(
                request_id = %replay.id(),
                status = response.status,
                "request rejected again after refresh"
            );
            return Err(ApiError::Authorization { response });
        }
        classify(response)
    }

    /// Sends `request` without any `Authorization` header and without
    /// refresh handling.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` on transport failure; the response is
    /// returned as-is whatever its status.
    pub async fn send_unauthenticated(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        Ok(self
            .transport
            .send(&request.without_authorization())
            .await?)
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(ApiRequest::get(path)).await
    }

    /// POST `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.request(ApiRequest::post(path).with_json(body)?).await
    }

    /// PUT `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn put<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.request(ApiRequest::put(path).with_json(body)?).await
    }

    /// PATCH `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn patch<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.request(ApiRequest::patch(path).with_json(body)?).await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(ApiRequest::delete(path)).await
    }

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`]; `ApiError::Decode` if the body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode(&self.get(path).await?)
    }

    /// POST `body` to `path` and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`Self::request`]; `ApiError::Decode` if the body does not match `T`.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        decode(&self.post(path, body).await?)
    }

    /// Wipes the stored session and broadcasts the reset. Safe to call
    /// repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be cleared.
    pub async fn reset_session(&self, reason: ResetReason) -> ApiResult<()> {
        self.session.clear().await?;
        info!(%reason, "session reset");
        self.emit(SessionEvent::SessionReset { reason });
        Ok(())
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn send_with(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<ApiResponse> {
        let outgoing = match token {
            Some(token) => request.with_bearer(token),
            None => request.without_authorization(),
        };
        debug!(
            request_id = %request.id(),
            method = %request.method(),
            path = request.path(),
            retry = request.retry_count(),
            "sending request"
        );
        Ok(self.transport.send(&outgoing).await?)
    }

    /// Obtains a token to replay with, refreshing at most once per cycle.
    async fn recover(&self, sent_token: Option<&str>) -> ApiResult<String> {
        if self.session.refresh_token().await?.is_none() {
            warn!("authorization failed and no refresh token is stored");
            return Err(self.expire(ResetReason::MissingRefreshToken).await);
        }

        let guard = loop {
            match self.refresh.join() {
                Ticket::Leader(guard) => break guard,
                Ticket::Waiter(waiter) => {
                    debug!("refresh in flight, waiting for it to settle");
                    if let Some(outcome) = waiter.outcome().await {
                        return outcome.map_err(|reason| ApiError::SessionExpired { reason });
                    }
                    debug!("refresh abandoned by its leader, joining again");
                }
            }
        };

        match self.lead_refresh(sent_token).await {
            Ok(token) => {
                let released = guard.settle(&Ok(token.clone()));
                debug!(waiters = released, "refresh cycle settled");
                Ok(token)
            }
            Err(reason) => {
                let err = self.expire(reason.clone()).await;
                guard.settle(&Err(reason));
                Err(err)
            }
        }
    }

    /// Refresh performed by the leader of a cycle. Any failure, including
    /// storage failures, is reported as the reason to reset the session.
    async fn lead_refresh(&self, sent_token: Option<&str>) -> Result<String, ResetReason> {
        // A cycle may have settled between our 401 and taking the lead.
        let current = self.session.access_token().await.map_err(refresh_failed)?;
        if let Some(current) = current.filter(|current| Some(current.as_str()) != sent_token) {
            debug!("token already refreshed by an earlier cycle");
            return Ok(current);
        }

        let Some(refresh_token) = self.session.refresh_token().await.map_err(refresh_failed)?
        else {
            return Err(ResetReason::MissingRefreshToken);
        };

        info!("refreshing access token");
        let response = self.call_refresh(&refresh_token).await.map_err(|err| {
            warn!(error = %err, "token refresh failed");
            refresh_failed(err)
        })?;
        let credentials = self.session.store_refreshed(response).await.map_err(|err| {
            warn!(error = %err, "failed to store refreshed tokens");
            refresh_failed(err)
        })?;

        let token = credentials.access_token;
        self.emit(SessionEvent::TokenRefreshed {
            token_preview: token_preview(&token),
        });
        info!("access token refreshed");
        Ok(token)
    }

    async fn call_refresh(&self, refresh_token: &str) -> ApiResult<RefreshResponse> {
        let request = ApiRequest::post(REFRESH_PATH).with_json(&RefreshRequest { refresh_token })?;
        let response = self.send_unauthenticated(&request).await?;
        if !response.is_success() {
            return Err(ApiError::from_response(response));
        }
        decode(&response)
    }

    /// Resets the session and returns the error handed to the caller.
    async fn expire(&self, reason: ResetReason) -> ApiError {
        if let Err(e) = self.reset_session(reason.clone()).await {
            error!(error = %e, "failed to clear session during reset");
        }
        ApiError::SessionExpired { reason }
    }
}

fn classify(response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        debug!(status = response.status, "request failed");
        Err(ApiError::from_response(response))
    }
}

fn refresh_failed(err: impl std::fmt::Display) -> ResetReason {
    ResetReason::RefreshFailed {
        message: err.to_string(),
    }
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    response
        .json()
        .map_err(|e| ApiError::Decode(e.to_string()))
}
