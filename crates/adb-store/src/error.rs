use adb_types::{ContentId, ResourceKind};

/// Errors from artifact store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record of this kind with this id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: ContentId },

    /// A required field is absent or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record was read back as the wrong kind.
    #[error("expected {expected}, got {actual}")]
    KindMismatch {
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// Normalization for hashing failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

impl From<adb_crypto::HasherError> for StoreError {
    fn from(err: adb_crypto::HasherError) -> Self {
        match err {
            adb_crypto::HasherError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
