//! High-level SDK for ADB.
//!
//! [`Db`] is the main entry point for applications embedding ADB. It owns
//! the shared artifact store, executes query and mutation documents, loads
//! build artifacts, and hands out [`Contract`] views by name.

pub mod db;
pub mod error;
pub mod loader;
pub mod operation;
pub mod response;

pub use db::Db;
pub use error::{ErrorKind, SdkError, SdkResult};
pub use loader::{read_artifacts_dir, LoadedArtifact, Loader};
pub use operation::{
    ArtifactsLoadInput, BytecodesAddInput, CompilationInput, CompilationsAddInput, Document,
    Operation, SourcesAddInput,
};
pub use response::{Response, ResponseError};

// Re-export key types
pub use adb_contract::{Contract, ContractError, RawArtifact};
pub use adb_graph::{ConnectionArgs, GraphError};
pub use adb_store::{ArtifactStore, InMemoryArtifactStore, Record, StoreError};
pub use adb_types::{Address, ContentId, NetworkId, ResourceKind};
