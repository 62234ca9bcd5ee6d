//! Key-value store port for persisted session state

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Process-wide string store holding session state under well-known keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key.
    async fn clear(&self) -> Result<(), StorageError>;
}
