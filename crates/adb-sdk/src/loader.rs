//! Loading build artifacts into the store.
//!
//! Each artifact contributes its source, its creation and deployed
//! bytecodes, and a place in a compilation. Artifacts built by the same
//! compiler (name, version and settings) share one compilation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use adb_contract::{Contract, RawArtifact};
use adb_store::{ArtifactStore, Bytecode, Compilation, CompilerInfo, Record};
use adb_types::ContentId;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{SdkError, SdkResult};

/// What one artifact put into the store.
#[derive(Debug)]
pub struct LoadedArtifact {
    pub contract: Contract,
    pub source: Option<ContentId>,
    pub bytecode: Option<ContentId>,
    pub deployed_bytecode: Option<ContentId>,
    pub compilation: Option<ContentId>,
}

/// Loads raw artifacts into an [`ArtifactStore`].
pub struct Loader<'a> {
    store: &'a dyn ArtifactStore,
}

impl<'a> Loader<'a> {
    pub fn new(store: &'a dyn ArtifactStore) -> Self {
        Self { store }
    }

    /// Load one artifact. Its source, if any, gets a compilation of its own.
    pub fn load_artifact(&self, raw: RawArtifact) -> SdkResult<LoadedArtifact> {
        let mut loaded = self.load_artifacts(vec![raw])?;
        loaded
            .pop()
            .ok_or_else(|| SdkError::Internal("artifact vanished during load".into()))
    }

    /// Load a batch, grouping sources that share a compiler into one
    /// compilation.
    pub fn load_artifacts(&self, raws: Vec<RawArtifact>) -> SdkResult<Vec<LoadedArtifact>> {
        let mut loaded = raws
            .into_iter()
            .map(|raw| self.store_pieces(raw))
            .collect::<SdkResult<Vec<_>>>()?;

        let mut groups: BTreeMap<GroupKey, (CompilerInfo, Vec<ContentId>)> = BTreeMap::new();
        for artifact in &loaded {
            let (Some(compiler), Some(source)) =
                (artifact.contract.artifact().compiler(), artifact.source)
            else {
                continue;
            };
            let (_, sources) = groups
                .entry(group_key(compiler)?)
                .or_insert_with(|| (compiler.clone(), Vec::new()));
            if !sources.contains(&source) {
                sources.push(source);
            }
        }

        let mut compilation_ids = BTreeMap::new();
        for (key, (compiler, sources)) in groups {
            let id = self.store.add(&Compilation::new(compiler, sources).into())?;
            debug!(compiler = %key.0, version = %key.1, %id, "stored compilation");
            compilation_ids.insert(key, id);
        }

        for artifact in &mut loaded {
            let compiler = match (artifact.contract.artifact().compiler(), artifact.source) {
                (Some(compiler), Some(_)) => compiler,
                _ => continue,
            };
            artifact.compilation = compilation_ids.get(&group_key(compiler)?).copied();
        }

        info!(
            artifacts = loaded.len(),
            compilations = compilation_ids.len(),
            "loaded artifacts"
        );
        Ok(loaded)
    }

    fn store_pieces(&self, raw: RawArtifact) -> SdkResult<LoadedArtifact> {
        let contract = Contract::from_raw(raw)?;
        let artifact = contract.artifact();

        let source = artifact
            .source()
            .map(|source| self.store.add(&Record::Source(source.clone())))
            .transpose()?;
        let bytecode = self.store_bytecode(contract.name(), artifact.bytecode())?;
        let deployed_bytecode = self.store_bytecode(contract.name(), artifact.deployed_bytecode())?;

        Ok(LoadedArtifact {
            contract,
            source,
            bytecode,
            deployed_bytecode,
            compilation: None,
        })
    }

    /// Interfaces and abstract contracts have empty bytecode; there is
    /// nothing to store for them.
    fn store_bytecode(&self, contract: &str, bytecode: &Bytecode) -> SdkResult<Option<ContentId>> {
        if bytecode.body().is_empty() {
            warn!(contract, "skipping empty bytecode");
            return Ok(None);
        }
        Ok(Some(self.store.add(&bytecode.clone().into())?))
    }
}

/// Compiler name, version and key-sorted settings JSON.
type GroupKey = (String, String, String);

fn group_key(compiler: &CompilerInfo) -> SdkResult<GroupKey> {
    let settings = serde_json::to_string(&compiler.settings)
        .map_err(|e| SdkError::Internal(format!("compiler settings: {e}")))?;
    Ok((compiler.name.clone(), compiler.version.clone(), settings))
}

/// Read every `*.json` artifact under `dir`, in path order.
pub fn read_artifacts_dir(dir: &Path) -> SdkResult<Vec<RawArtifact>> {
    let io_error = |path: &Path, message: String| SdkError::Io {
        path: path.display().to_string(),
        message,
    };

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| io_error(dir, e.to_string()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path.to_path_buf());
        }
    }

    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|e| io_error(path, e.to_string()))?;
            RawArtifact::from_json(&text).map_err(|e| io_error(path, e.to_string()))
        })
        .collect()
}
