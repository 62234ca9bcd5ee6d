//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. Request paths are
//! resolved against the configured API base URL.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use netadmin_application::ports::{HttpTransport, TransportError, TransportFuture};
use netadmin_domain::{ApiRequest, ApiResponse, HttpMethod};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Url};

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("netadmin/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry paths or the client
    /// cannot be created.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Self::with_client(client, base_url, timeout)
    }

    /// Creates a transport around an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidUrl` if `base_url` cannot be a base.
    pub fn with_client(
        client: Client,
        mut base_url: Url,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }
        // Without the trailing slash `join` would drop the last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// API base URL, always ending in `/`.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the request's path against the base URL.
    ///
    /// # Errors
    ///
    /// Absolute URLs are rejected so that the bearer token never leaves the
    /// configured API.
    pub fn resolve(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let relative = request.relative_path();
        if relative.contains("://") {
            return Err(TransportError::InvalidUrl(format!(
                "absolute URL not allowed: {}",
                request.path()
            )));
        }
        self.base_url
            .join(relative)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.path())))
    }

    /// Builds the outgoing reqwest request.
    ///
    /// `Accept: application/json` is added unless the caller set an
    /// `Accept` header. The JSON body is only sent for methods that carry
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be resolved or a header value is
    /// not valid on the wire.
    pub fn build(&self, request: &ApiRequest) -> Result<reqwest::Request, TransportError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method()), self.resolve(request)?)
            .timeout(self.timeout);
        if request.headers().get(ACCEPT.as_str()).is_none() {
            builder = builder.header(ACCEPT, "application/json");
        }
        for header in request.headers().iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = request.body().filter(|_| request.method().has_body()) {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build request: {e}")))
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            };
        }
        if error.is_connect() {
            return TransportError::Connect(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> TransportFuture<'_> {
        let built = self.build(request);

        Box::pin(async move {
            let built = built?;
            let start = Instant::now();
            let response = self
                .client
                .execute(built)
                .await
                .map_err(|e| self.map_error(&e))?;
            let status = response.status().as_u16();
            let response_headers: BTreeMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
                .to_vec();

            Ok(ApiResponse {
                status,
                headers: response_headers,
                body,
                duration: start.elapsed(),
            })
        })
    }
}
