use adb_store::StoreError;
use thiserror::Error;

/// Errors from graph resolution.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An opaque id or cursor could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No node answers to the given id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid pagination or lookup arguments.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GraphError {
    /// `true` when the error means "nothing there", whichever layer noticed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Store(StoreError::NotFound { .. })
        )
    }
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
