//! In-memory doubles for the ports, shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use netadmin_domain::{ApiRequest, ApiResponse};

use crate::auth::{REFRESH_PATH, SessionStore, keys};
use crate::client::AuthenticatedClient;
use crate::ports::{
    Clock, HttpTransport, KeyValueStore, StorageError, TransportError, TransportFuture,
};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// Scripted backend recording every request it receives.
pub struct MockBackend {
    handler: Box<Handler>,
    refresh_delay: Duration,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockBackend {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            refresh_delay: Duration::ZERO,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Holds refresh responses back so that concurrent callers pile up.
    pub const fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|r| r.path() == path)
            .cloned()
            .collect()
    }

    pub fn bearer_tokens(&self, path: &str) -> Vec<Option<String>> {
        self.requests_to(path)
            .iter()
            .map(|r| r.bearer_token().map(String::from))
            .collect()
    }

    pub fn refresh_calls(&self) -> usize {
        self.requests_to(REFRESH_PATH).len()
    }
}

impl HttpTransport for MockBackend {
    fn send(&self, request: &ApiRequest) -> TransportFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            self.log
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(request.clone());
            if request.path() == REFRESH_PATH && !self.refresh_delay.is_zero() {
                tokio::time::sleep(self.refresh_delay).await;
            }
            (self.handler)(&request)
        })
    }
}

/// Map-backed key-value store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    failing_key: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Makes every later write to `key` fail as if the disk were full.
    pub fn fail_writes_to(&self, key: &str) {
        *self
            .failing_key
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(key.to_string());
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let failing = self
            .failing_key
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_deref()
            == Some(key);
        if failing {
            return Err(StorageError::Io("disk full".to_string()));
        }
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.lock().clear();
        Ok(())
    }
}

/// Clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn epoch() -> Self {
        let start = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_default();
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Store holding a session as written by an earlier login.
pub fn logged_in_store(access_token: &str, refresh_token: Option<&str>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    store.insert(keys::ACCESS_TOKEN, access_token);
    if let Some(refresh_token) = refresh_token {
        store.insert(keys::REFRESH_TOKEN, refresh_token);
    }
    store.insert(keys::USERNAME, "admin");
    store
}

pub fn client_with(backend: &Arc<MockBackend>, store: Arc<MemoryStore>) -> AuthenticatedClient {
    let session = SessionStore::new(store, Arc::new(FixedClock::epoch()));
    AuthenticatedClient::new(backend.clone(), session)
}
