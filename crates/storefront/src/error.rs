//! Error type for session state operations.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by the cart and address containers.
///
/// Unknown ids are reported as `NotFound` instead of being ignored, so a
/// caller can tell "nothing to do" apart from "nothing matched".
#[derive(Debug, Error)]
pub enum StateError {
    /// No record with the given id exists in the collection.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A cart line cannot hold this many units.
    #[error("Quantity out of range: {0}")]
    QuantityOutOfRange(i64),

    /// The change could not be written and was not applied (strict writes).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StateError {
    pub(crate) fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} {id}"))
    }
}

/// Result type alias for `StateError`.
pub type Result<T> = std::result::Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_display() {
        let err = StateError::not_found("address", "a1");
        assert_eq!(err.to_string(), "Not found: address a1");

        let err = StateError::from(StorageError::InvalidKey("bad key".to_owned()));
        assert_eq!(err.to_string(), "Storage error: invalid storage key \"bad key\"");
    }
}
