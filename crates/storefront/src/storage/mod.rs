//! Durable key-value storage for session state.
//!
//! Session state is kept as named JSON blobs, the same way a browser client
//! keeps it in local storage. Containers read their blob once when they are
//! built and write the whole collection back after every mutation.
//!
//! # Backends
//!
//! - [`MemoryStore`] - non-persistent, with an optional byte quota (tests,
//!   disposable sessions)
//! - [`FileStore`] - one JSON file per key under a data directory
//!
//! # Keys
//!
//! The keys used by the storefront live in [`crate::models::session::keys`].

mod file;
mod memory;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key contains characters the backend cannot store.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// Reading the stored value failed.
    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The medium rejected the write.
    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The write would exceed the store's quota.
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Stored data is present but is not the expected shape.
    #[error("malformed data in {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be serialized.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Whether the error means a write did not reach the medium.
    #[must_use]
    pub const fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::Write { .. } | Self::QuotaExceeded { .. } | Self::Encode { .. }
        )
    }
}

/// A persistent area of named string values.
///
/// Implementations must be `Send + Sync`; mutations take `&self` and rely on
/// interior mutability.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Read` if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a write error if the medium rejects the value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a write error if the medium rejects the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Load and decode the JSON blob under `key`.
///
/// Fails soft: a missing key, an unreadable medium, or data that does not
/// parse as `T` all return `None` so the caller can fall back to its seed.
/// Failures are logged, never surfaced.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored state");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(source) => {
            let error = StorageError::Parse {
                key: key.to_owned(),
                source,
            };
            tracing::warn!(key, error = %error, "Discarding malformed stored state");
            None
        }
    }
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError::Encode` if the value cannot be serialized, or the
/// backend's write error if the medium rejects it.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &raw)
}

/// Check that a key only uses `[A-Za-z0-9_-]`.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
