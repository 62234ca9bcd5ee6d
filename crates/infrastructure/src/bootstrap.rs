//! Wiring of the production adapters into an [`AuthService`].

use std::sync::Arc;

use netadmin_application::ports::KeyValueStore;
use netadmin_application::{AuthService, AuthenticatedClient, SessionStore, TransportError};
use tracing::debug;

use crate::adapters::{ReqwestTransport, SystemClock};
use crate::config::ClientConfig;
use crate::persistence::{FileKeyValueStore, MemoryKeyValueStore};

/// Picks the session store for `config`: the session file when a location
/// is known, otherwise process memory.
#[must_use]
pub fn session_backend(config: &ClientConfig) -> Arc<dyn KeyValueStore> {
    match config.session_path() {
        Some(path) => {
            let store = FileKeyValueStore::new(path);
            debug!(path = %store.path().display(), "Persisting session to file");
            Arc::new(store)
        }
        None => {
            debug!("No session file location, keeping session in memory");
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

/// Builds an authenticated client over reqwest for `config`, with session
/// state kept in `store`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the base URL
/// cannot carry paths.
pub fn build_client(
    config: &ClientConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<AuthenticatedClient, TransportError> {
    let transport = ReqwestTransport::new(config.base_url.clone(), config.request_timeout)?;
    let session = SessionStore::new(store, Arc::new(SystemClock::new()));
    Ok(AuthenticatedClient::new(Arc::new(transport), session).with_policy(config.policy()))
}

/// Like [`build_client`], wrapped in an [`AuthService`].
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_auth_service(
    config: &ClientConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<AuthService, TransportError> {
    build_client(config, store).map(AuthService::new)
}
