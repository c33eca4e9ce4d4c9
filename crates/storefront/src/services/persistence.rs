//! Write-back of container state to the durable store.

use serde::Serialize;

use crate::models::WriteMode;
use crate::storage::{self, KeyValueStore, SharedStore, StorageError};

/// Binds a container to one key of a store and applies its [`WriteMode`].
#[derive(Debug)]
pub(crate) struct Persistence {
    store: Option<SharedStore>,
    key: &'static str,
    mode: WriteMode,
    last_error: Option<String>,
}

impl Persistence {
    /// State lives only in memory; every write trivially succeeds.
    pub(crate) const fn ephemeral(key: &'static str) -> Self {
        Self {
            store: None,
            key,
            mode: WriteMode::BestEffort,
            last_error: None,
        }
    }

    pub(crate) const fn durable(store: SharedStore, key: &'static str, mode: WriteMode) -> Self {
        Self {
            store: Some(store),
            key,
            mode,
            last_error: None,
        }
    }

    pub(crate) fn store(&self) -> Option<&SharedStore> {
        self.store.as_ref()
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub(crate) fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace `*slot` with `next` and write it.
    ///
    /// Strict mode writes `next` first and leaves `*slot` untouched if the
    /// write fails. Best-effort mode always commits; a failed write is logged
    /// and kept as [`Self::last_error`].
    pub(crate) fn commit<T: Serialize>(&mut self, slot: &mut T, next: T) -> Result<(), StorageError> {
        match self.mode {
            WriteMode::Strict => {
                self.write(&next)?;
                *slot = next;
            }
            WriteMode::BestEffort => {
                *slot = next;
                self.write_best_effort(slot);
            }
        }
        Ok(())
    }

    /// Delete the key, under the same policy as [`Self::commit`].
    pub(crate) fn clear<T>(&mut self, slot: &mut Option<T>) -> Result<(), StorageError> {
        match self.mode {
            WriteMode::Strict => {
                self.remove()?;
                *slot = None;
            }
            WriteMode::BestEffort => {
                *slot = None;
                if let Err(e) = self.remove() {
                    tracing::warn!(key = self.key, error = %e, "State removal failed");
                }
            }
        }
        Ok(())
    }

    /// Write `value`, logging instead of returning a failure.
    pub(crate) fn write_best_effort<T: Serialize + ?Sized>(&mut self, value: &T) {
        if let Err(e) = self.write(value) {
            tracing::warn!(
                key = self.key,
                error = %e,
                "State write failed; keeping in-memory state"
            );
        }
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let result = store.remove(self.key);
        self.last_error = result.as_ref().err().map(ToString::to_string);
        result
    }

    fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StorageError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        match storage::save(&**store, self.key, value) {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
