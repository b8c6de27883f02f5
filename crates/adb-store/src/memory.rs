use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use adb_types::{ContentId, ResourceKind};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use crate::traits::ArtifactStore;

#[derive(Default)]
struct Tables {
    records: HashMap<(ResourceKind, ContentId), Record>,
    order: BTreeMap<ResourceKind, Vec<ContentId>>,
}

/// In-memory, HashMap-based artifact store.
///
/// All records are held behind a single `RwLock`: reads run concurrently and
/// every add performs its existence check and insert under one write guard.
/// Records are cloned on read.
pub struct InMemoryArtifactStore {
    tables: RwLock<Tables>,
}

impl InMemoryArtifactStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Number of records of all kinds.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_tables(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write_tables(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn add(&self, record: &Record) -> StoreResult<ContentId> {
        record.validate()?;
        let kind = record.kind();
        let id = record.compute_id()?;

        let mut tables = self.write_tables()?;
        if tables.records.contains_key(&(kind, id)) {
            debug!(%kind, id = %id.short_hex(), "record already stored");
            return Ok(id);
        }

        if let Record::Compilation(compilation) = record {
            if let Some(missing) = compilation
                .sources
                .iter()
                .find(|s| !tables.records.contains_key(&(ResourceKind::Source, s.id)))
            {
                return Err(StoreError::Validation(format!(
                    "compilation references unknown source {}",
                    missing.id
                )));
            }
        }

        tables.records.insert((kind, id), record.normalized());
        tables.order.entry(kind).or_default().push(id);
        debug!(%kind, id = %id.short_hex(), "record stored");
        Ok(id)
    }

    fn get(&self, kind: ResourceKind, id: &ContentId) -> StoreResult<Record> {
        let tables = self.read_tables()?;
        tables
            .records
            .get(&(kind, *id))
            .cloned()
            .ok_or(StoreError::NotFound { kind, id: *id })
    }

    fn contains(&self, kind: ResourceKind, id: &ContentId) -> StoreResult<bool> {
        let tables = self.read_tables()?;
        Ok(tables.records.contains_key(&(kind, *id)))
    }

    fn list(&self, kind: ResourceKind) -> StoreResult<Vec<(ContentId, Record)>> {
        let tables = self.read_tables()?;
        let Some(ids) = tables.order.get(&kind) else {
            return Ok(Vec::new());
        };
        ids.iter()
            .map(|id| {
                tables
                    .records
                    .get(&(kind, *id))
                    .cloned()
                    .map(|record| (*id, record))
                    .ok_or(StoreError::NotFound { kind, id: *id })
            })
            .collect()
    }

    fn count(&self, kind: ResourceKind) -> StoreResult<usize> {
        let tables = self.read_tables()?;
        Ok(tables.order.get(&kind).map_or(0, Vec::len))
    }
}

impl std::fmt::Debug for InMemoryArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryArtifactStore")
            .field("record_count", &self.len())
            .finish()
    }
}
