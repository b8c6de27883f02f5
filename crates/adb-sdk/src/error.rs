use adb_contract::ContractError;
use adb_graph::GraphError;
use adb_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("contract not found: {0}")]
    ContractNotFound(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SdkError {
    /// The stable category reported alongside the message in responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::ContractNotFound(_) => ErrorKind::NotFound,
            Self::Io { .. } | Self::Internal(_) => ErrorKind::Internal,
            Self::Contract(err) => contract_kind(err),
            Self::Graph(err) => match err {
                GraphError::Decode(_) => ErrorKind::Decode,
                GraphError::NotFound(_) => ErrorKind::NotFound,
                GraphError::Validation(_) => ErrorKind::Validation,
                GraphError::Store(err) => store_kind(err),
            },
            Self::Store(err) => store_kind(err),
        }
    }
}

fn contract_kind(err: &ContractError) -> ErrorKind {
    match err {
        ContractError::Validation(_) | ContractError::Type(_) => ErrorKind::Validation,
        ContractError::NetworkIdNotSet { .. } | ContractError::NoNetworkConfiguration { .. } => {
            ErrorKind::Configuration
        }
        ContractError::NotDeployed { .. } => ErrorKind::NotDeployed,
        ContractError::Poisoned(_) => ErrorKind::Internal,
    }
}

fn store_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::NotFound { .. } => ErrorKind::NotFound,
        StoreError::Validation(_) | StoreError::KindMismatch { .. } => ErrorKind::Validation,
        StoreError::Serialization(_) | StoreError::Poisoned(_) => ErrorKind::Internal,
    }
}

/// Error category carried in [`ResponseError`](crate::ResponseError).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    NotDeployed,
    NotFound,
    Decode,
    Internal,
}

pub type SdkResult<T> = Result<T, SdkError>;
