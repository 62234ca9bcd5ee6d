//! End-to-end session flow against a local backend
//!
//! These tests run a small axum server that mimics the network-admin API
//! (login, refresh, profile) and drive the production wiring through it:
//! reqwest transport, file-backed session, single-flight refresh.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::tempdir;

use netadmin_application::auth::PROFILE_PATH;
use netadmin_application::{ApiError, AuthService};
use netadmin_domain::{ResetReason, SessionEvent, UserProfile};
use netadmin_infrastructure::{ClientConfig, build_auth_service, session_backend};

const REFRESH_DELAY: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Backend {
    access: Option<String>,
    refresh: Option<String>,
    issued: u32,
    refresh_calls: u32,
}

impl Backend {
    fn issue(&mut self) -> (String, String) {
        self.issued += 1;
        let access = format!("access-{}", self.issued);
        let refresh = format!("refresh-{}", self.issued);
        self.access = Some(access.clone());
        self.refresh = Some(refresh.clone());
        (access, refresh)
    }
}

type Shared = Arc<Mutex<Backend>>;

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn authorized(state: &Shared, headers: &HeaderMap) -> bool {
    let presented = bearer(headers);
    presented.is_some() && presented == state.lock().unwrap().access
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["username"] != "admin" || body["password"] != "secret" {
        return unauthorized("No active account found with the given credentials");
    }
    let (access, refresh) = state.lock().unwrap().issue();
    Json(json!({ "token": access, "refresh_token": refresh, "expires_in": 3600 })).into_response()
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let accepted = {
        let mut backend = state.lock().unwrap();
        backend.refresh_calls += 1;
        let presented = body["refresh_token"].as_str().map(str::to_string);
        presented.is_some() && presented == backend.refresh
    };

    tokio::time::sleep(REFRESH_DELAY).await;

    if !accepted {
        return unauthorized("Token is invalid or expired");
    }
    let (access, refresh) = state.lock().unwrap().issue();
    Json(json!({ "access_token": access, "refresh_token": refresh })).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized("Given token not valid for any token type");
    }
    Json(json!({
        "id": 7,
        "email": "ops@example.net",
        "username": "admin",
        "first_name": "Grace",
        "last_name": "Hopper",
        "is_active": true,
        "is_staff": true,
        "is_superuser": false
    }))
    .into_response()
}

async fn create_device(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized("Given token not valid for any token type");
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "mac_address": ["This field is required."] })),
    )
        .into_response()
}

async fn spawn_backend() -> (SocketAddr, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/api/v1/user/network-admin/login/", post(login))
        .route("/api/v1/user/refresh/", post(refresh))
        .route("/api/v1/user/me/", get(me))
        .route("/api/v1/devices/", post(create_device))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (addr, state)
}

fn service_for(addr: SocketAddr, session_file: &Path) -> AuthService {
    let base_url = format!("http://{addr}/api/v1");
    let session_file = session_file.display().to_string();
    let config = ClientConfig::from_lookup(|key| match key {
        "NETADMIN_API_BASE_URL" => Some(base_url.clone()),
        "NETADMIN_SESSION_FILE" => Some(session_file.clone()),
        _ => None,
    })
    .unwrap();
    build_auth_service(&config, session_backend(&config)).unwrap()
}

fn stored(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let (addr, backend) = spawn_backend().await;
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let service = service_for(addr, &session_file);
    let mut events = service.client().subscribe();

    let credentials = service.login("admin", "secret").await.unwrap();
    assert_eq!(credentials.access_token, "access-1");
    assert_eq!(stored(&session_file)["token"], "access-1");
    assert_eq!(stored(&session_file)["auth_username"], "admin");

    backend.lock().unwrap().access = None;

    let profile = service.profile().await.unwrap();
    assert_eq!(profile.display_name(), "Grace Hopper");
    assert_eq!(backend.lock().unwrap().refresh_calls, 1);

    let session = stored(&session_file);
    assert_eq!(session["token"], "access-2");
    assert_eq!(session["refreshToken"], "refresh-2");

    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedIn {
            username: "admin".to_string()
        }
    );
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::TokenRefreshed { .. }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rejections_share_one_refresh() {
    let (addr, backend) = spawn_backend().await;
    let dir = tempdir().unwrap();
    let service = service_for(addr, &dir.path().join("session.json"));
    service.login("admin", "secret").await.unwrap();

    backend.lock().unwrap().access = None;

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let client = service.client().clone();
            tokio::spawn(async move { client.get_json::<UserProfile>(PROFILE_PATH).await })
        })
        .collect();

    for handle in handles {
        let profile = handle.await.unwrap().unwrap();
        assert_eq!(profile.username, "admin");
    }
    assert_eq!(backend.lock().unwrap().refresh_calls, 1);
    assert!(!service.client().refresh_coordinator().is_refreshing());
}

#[tokio::test]
async fn test_rejected_refresh_resets_session() {
    let (addr, backend) = spawn_backend().await;
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let service = service_for(addr, &session_file);
    service.login("admin", "secret").await.unwrap();
    let mut events = service.client().subscribe();

    {
        let mut backend = backend.lock().unwrap();
        backend.access = None;
        backend.refresh = None;
    }

    let err = service.profile().await.unwrap_err();
    assert!(err.is_session_expired(), "unexpected error: {err}");
    assert!(!service.is_authenticated().await.unwrap());
    assert!(!session_file.exists());

    match events.try_recv().unwrap() {
        SessionEvent::SessionReset {
            reason: ResetReason::RefreshFailed { .. },
        } => {}
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_password_is_not_stored() {
    let (addr, _backend) = spawn_backend().await;
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let service = service_for(addr, &session_file);

    let err = service.login("admin", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Authorization { .. }));
    assert_eq!(err.status(), Some(401));
    assert!(!service.is_authenticated().await.unwrap());
    assert!(!session_file.exists());
}

#[tokio::test]
async fn test_validation_errors_pass_through() {
    let (addr, backend) = spawn_backend().await;
    let dir = tempdir().unwrap();
    let service = service_for(addr, &dir.path().join("session.json"));
    service.login("admin", "secret").await.unwrap();

    let err = service
        .client()
        .post("devices/", &json!({ "name": "ap-01" }))
        .await
        .unwrap_err();

    let ApiError::Validation { response } = err else {
        panic!("expected a validation error");
    };
    assert_eq!(response.status, 400);
    let body: Value = response.json().unwrap();
    assert_eq!(body["mac_address"][0], "This field is required.");
    assert_eq!(backend.lock().unwrap().refresh_calls, 0);
}
