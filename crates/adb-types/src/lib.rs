//! Foundation types for ADB, the contract artifact database.
//!
//! Every other ADB crate depends on `adb-types`.
//!
//! # Key Types
//!
//! - [`ContentId`]: content-addressed identifier (BLAKE3 hash of normalized content)
//! - [`ResourceKind`]: closed set of content-addressed record kinds
//! - [`Address`]: deployed contract / library address
//! - [`TxHash`]: deployment transaction hash
//! - [`NetworkId`]: identifier of the network a deployment lives on
//! - [`AbiEntry`]: one entry of a contract ABI

pub mod abi;
pub mod address;
pub mod error;
pub mod id;
pub mod kind;
pub mod network;

pub use abi::{AbiEntry, AbiEntryKind, AbiParam};
pub use address::{Address, TxHash};
pub use error::TypeError;
pub use id::ContentId;
pub use kind::ResourceKind;
pub use network::NetworkId;
