use adb_types::{ContentId, ResourceKind};

use crate::error::StoreResult;
use crate::record::{Bytecode, Compilation, Record, Source};

/// Content-addressed artifact store.
///
/// All implementations must satisfy these invariants:
/// - Records are immutable once written. The same content always produces
///   the same id, and adding it again is a no-op that returns that id.
/// - Check-and-insert is atomic: concurrent adds of identical content never
///   produce two entries.
/// - `list` is ordered by first insertion and never reorders.
/// - Concurrent reads are always safe.
pub trait ArtifactStore: Send + Sync {
    /// Validate and store a record, returning its content-addressed id.
    fn add(&self, record: &Record) -> StoreResult<ContentId>;

    /// Read a record of `kind` by id.
    ///
    /// Returns `Err(StoreError::NotFound)` if no such record exists.
    fn get(&self, kind: ResourceKind, id: &ContentId) -> StoreResult<Record>;

    /// Check whether a record of `kind` exists.
    fn contains(&self, kind: ResourceKind, id: &ContentId) -> StoreResult<bool>;

    /// All records of `kind` in first-insertion order.
    fn list(&self, kind: ResourceKind) -> StoreResult<Vec<(ContentId, Record)>>;

    /// Number of records of `kind`.
    fn count(&self, kind: ResourceKind) -> StoreResult<usize>;

    /// Add several records, returning their ids in input order.
    ///
    /// Default implementation calls `add()` for each record and stops at the
    /// first failure.
    fn add_batch(&self, records: &[Record]) -> StoreResult<Vec<ContentId>> {
        records.iter().map(|record| self.add(record)).collect()
    }

    /// Read several records of one kind.
    fn get_batch(&self, kind: ResourceKind, ids: &[ContentId]) -> StoreResult<Vec<Record>> {
        ids.iter().map(|id| self.get(kind, id)).collect()
    }

    fn source(&self, id: &ContentId) -> StoreResult<Source> {
        self.get(ResourceKind::Source, id)?.into_source()
    }

    fn bytecode(&self, id: &ContentId) -> StoreResult<Bytecode> {
        self.get(ResourceKind::Bytecode, id)?.into_bytecode()
    }

    fn compilation(&self, id: &ContentId) -> StoreResult<Compilation> {
        self.get(ResourceKind::Compilation, id)?.into_compilation()
    }
}
