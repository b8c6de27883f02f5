//! Contract artifact views for ADB.
//!
//! A [`Contract`] pairs an immutable [`ContractArtifact`] (ABI, bytecodes,
//! compiler metadata) with a [`NetworkOverlay`] holding the mutable
//! per-network deployment records. Everything callers read about a
//! deployment is derived from those two pieces on demand:
//!
//! - [`link`] -- writes library addresses into bytecode placeholders
//! - [`network`] -- address / links / events per network id, with lazy
//!   record creation
//! - [`events`] -- merges ABI events with recorded events, keyed by topic
//!
//! The network id is always passed in explicitly; there is no "current
//! network" state.

pub mod artifact;
pub mod contract;
pub mod error;
pub mod events;
pub mod link;
pub mod network;
pub mod options;

pub use artifact::{ContractArtifact, RawArtifact};
pub use contract::Contract;
pub use error::{ContractError, ContractResult};
pub use events::{event_key, merge_events};
pub use link::{detect_link_references, link_bytecode, PLACEHOLDER_LENGTH};
pub use network::{NetworkOverlay, NetworkRecord};
pub use options::{ContractOptions, NumberFormat};
