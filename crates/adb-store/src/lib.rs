//! Content-addressed artifact storage for ADB.
//!
//! Every compiled-contract artifact piece -- source files, bytecodes,
//! compilations -- is stored as an immutable record identified by the
//! BLAKE3 hash of its normalized content (domain-separated by record kind).
//!
//! # Record Types
//!
//! - [`Source`] -- source file contents and path
//! - [`Bytecode`] -- hex bytecode with link references
//! - [`Compilation`] -- compiler description plus the sources it compiled
//!
//! # Storage Backends
//!
//! All backends implement the [`ArtifactStore`] trait:
//!
//! - [`InMemoryArtifactStore`] -- `HashMap`-based store behind a `RwLock`
//!
//! # Design Rules
//!
//! 1. Records are immutable once written; a content change is a new id.
//! 2. Adding identical content twice returns the existing id (no duplicate).
//! 3. Check-and-insert happens under one write guard.
//! 4. `list` returns records in first-insertion order, which is stable.

pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryArtifactStore;
pub use record::{Bytecode, Compilation, CompilerInfo, LinkReference, Record, Source, SourceRef};
pub use traits::ArtifactStore;
