//! Error types for contract artifact views.

use adb_types::{NetworkId, TypeError};
use thiserror::Error;

/// Errors from resolving a contract's deployment data.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A required value is absent or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller did not supply a network id.
    #[error(
        "{contract} has no network id set, cannot lookup artifact data. \
         Set the network id explicitly before resolving deployment data."
    )]
    NetworkIdNotSet { contract: String },

    /// No deployment record exists for the requested network id.
    #[error("{contract} has no network configuration for its current network id ({network_id}).")]
    NoNetworkConfiguration {
        contract: String,
        network_id: NetworkId,
    },

    /// A record exists for the network but carries no address.
    #[error("Cannot find deployed address: {contract} not deployed or address not set.")]
    NotDeployed { contract: String },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("network overlay lock poisoned: {0}")]
    Poisoned(String),
}

impl ContractError {
    /// `true` for the two configuration failures (network id unset, no
    /// record for the id).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NetworkIdNotSet { .. } | Self::NoNetworkConfiguration { .. }
        )
    }
}

/// Convenience type alias for contract operations.
pub type ContractResult<T> = std::result::Result<T, ContractError>;
