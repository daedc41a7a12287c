//! Persistent key/value storage for settings and credentials.
//!
//! The store is a leaf dependency: it reads and writes whole values by key and
//! knows nothing about what they mean. Two implementations exist:
//!
//! - [`FileStore`]: one JSON file per key under a data directory
//! - [`MemoryStore`]: process-local map, for ephemeral sessions and tests
//!
//! Typed access goes through [`load_json`] / [`save_json`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key holding the full serialized [`SettingsDocument`](crate::models::SettingsDocument).
pub const SETTINGS_KEY: &str = "settings";

/// Key holding the serialized [`CredentialPair`](crate::models::CredentialPair).
pub const CREDENTIALS_KEY: &str = "steamCookies";

/// Errors that can occur reading or writing the store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable whole-value key/value storage.
///
/// Implementations must replace a value atomically: a reader sees either the
/// previous value or the new one, never a partial write.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`, `None` if it was never written or was removed
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and deserialize a JSON value.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })
}

/// Serialize and write a JSON value.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;

    store.set(key, &raw)
}
