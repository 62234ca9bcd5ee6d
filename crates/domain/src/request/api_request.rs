//! Replayable API request

use serde::Serialize;
use uuid::Uuid;

use super::headers::{AUTHORIZATION, Header, Headers};
use super::method::HttpMethod;
use crate::error::{DomainError, DomainResult};

/// A request against the admin backend, relative to the configured base URL.
///
/// The value is immutable once built: attaching a token or marking a replay
/// returns a new request. `retry_count` records how many times this logical
/// request has been re-issued after an authorization failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    id: Uuid,
    method: HttpMethod,
    path: String,
    headers: Headers,
    body: Option<serde_json::Value>,
    retry_count: u8,
}

impl ApiRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
            retry_count: 0,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if `body` cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        Ok(self.with_body(value))
    }

    /// Attaches an already-encoded JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds or replaces a header.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidHeaderName` if the name is not a valid token.
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomainResult<Self> {
        self.headers.set(Header::new(name, value)?);
        Ok(self)
    }

    /// Returns a copy carrying `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_bearer(&self, token: &str) -> Self {
        let mut next = self.clone();
        next.headers.set(Header {
            name: AUTHORIZATION.to_string(),
            value: format!("Bearer {token}"),
        });
        next
    }

    /// Returns a copy with any `Authorization` header removed.
    #[must_use]
    pub fn without_authorization(&self) -> Self {
        let mut next = self.clone();
        next.headers.remove(AUTHORIZATION);
        next
    }

    /// Returns the replay of this request, with the retry count bumped.
    #[must_use]
    pub fn retried(&self) -> Self {
        let mut next = self.clone();
        next.retry_count = self.retry_count.saturating_add(1);
        next
    }

    /// Unique id shared by a request and all of its replays.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path as given by the caller.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path with leading slashes removed, ready to join onto a base URL.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Number of replays this request has been through.
    #[must_use]
    pub const fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// True once the request has been replayed after an authorization failure.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.retry_count > 0
    }

    /// The bearer token currently attached, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_with_bearer_leaves_original_untouched() {
        let request = ApiRequest::get("devices/");
        let authed = request.with_bearer("abc");

        assert_eq!(request.bearer_token(), None);
        assert_eq!(authed.bearer_token(), Some("abc"));
        assert_eq!(authed.headers().get("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_rebearing_replaces_token() {
        let request = ApiRequest::get("devices/").with_bearer("abc").with_bearer("abc2");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.bearer_token(), Some("abc2"));
    }

    #[test]
    fn test_retried_keeps_identity() {
        let request = ApiRequest::post("user/refresh/")
            .with_json(&json!({"refresh_token": "xyz"}))
            .unwrap();
        let replay = request.retried();

        assert_eq!(request.retry_count(), 0);
        assert!(!request.is_retry());
        assert_eq!(replay.retry_count(), 1);
        assert!(replay.is_retry());
        assert_eq!(replay.id(), request.id());
        assert_eq!(replay.body(), request.body());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(ApiRequest::get("/user/me/").relative_path(), "user/me/");
        assert_eq!(ApiRequest::get("user/me/").relative_path(), "user/me/");
    }

    #[test]
    fn test_without_authorization() {
        let request = ApiRequest::get("user/me/").with_bearer("abc");
        assert_eq!(request.without_authorization().bearer_token(), None);
    }
}
