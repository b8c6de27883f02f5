use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use adb_contract::{Contract, RawArtifact};
use adb_graph::{decode, global_id_of, GraphResolver, NodeRef};
use adb_store::{ArtifactStore, Compilation, InMemoryArtifactStore, Record};
use adb_types::{ContentId, ResourceKind};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};
use crate::loader::{read_artifacts_dir, Loader};
use crate::operation::{ArtifactsLoadInput, CompilationInput, Document, Operation};
use crate::response::Response;

/// The ADB database: a shared artifact store, its graph view, and the
/// contracts loaded into it.
pub struct Db {
    store: Arc<dyn ArtifactStore>,
    resolver: GraphResolver,
    contracts: RwLock<BTreeMap<String, Arc<Contract>>>,
    build_dir: Option<PathBuf>,
}

impl Db {
    /// A database over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryArtifactStore::new()))
    }

    pub fn with_store(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            resolver: GraphResolver::new(Arc::clone(&store)),
            store,
            contracts: RwLock::new(BTreeMap::new()),
            build_dir: None,
        }
    }

    /// Set the directory of build artifacts read by `artifactsLoad`.
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    pub fn build_dir(&self) -> Option<&Path> {
        self.build_dir.as_deref()
    }

    /// Load every artifact in the build directory. Without one, loads nothing.
    pub fn load_build_dir(&self) -> SdkResult<Vec<(String, Option<ContentId>)>> {
        match &self.build_dir {
            Some(dir) => self.load_artifacts(read_artifacts_dir(dir)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn resolver(&self) -> &GraphResolver {
        &self.resolver
    }

    /// Execute a document. Failures are reported in `Response.errors`.
    pub fn execute(&self, document: impl Into<Document>, variables: &Value) -> Response {
        match self.try_execute(document.into(), variables) {
            Ok(data) => Response::ok(data),
            Err(err) => {
                debug!(error = %err, kind = ?err.kind(), "operation failed");
                Response::error(&err)
            }
        }
    }

    /// Same as [`Db::execute`].
    pub fn query(&self, document: impl Into<Document>, variables: &Value) -> Response {
        self.execute(document, variables)
    }

    fn try_execute(&self, document: Document, variables: &Value) -> SdkResult<Value> {
        let operation = document.resolve(variables)?;
        let name = operation.name();
        let mut data = Map::new();
        data.insert(name.to_string(), self.run(operation)?);
        Ok(Value::Object(data))
    }

    fn run(&self, operation: Operation) -> SdkResult<Value> {
        match operation {
            Operation::Node { id } => to_value(self.resolver.node(&id)?),
            Operation::Source { id } => to_value(self.resolver.source(&id)?),
            Operation::Bytecode { id } => to_value(self.resolver.bytecode(&id)?),
            Operation::Compilation { id } => to_value(self.resolver.compilation(&id)?),
            Operation::Sources { args } => to_value(self.resolver.sources(&args)?),
            Operation::Bytecodes { args } => to_value(self.resolver.bytecodes(&args)?),
            Operation::Compilations { args } => to_value(self.resolver.compilations(&args)?),
            Operation::CompilationSources { id, args } => {
                to_value(self.resolver.compilation_sources(&id, &args)?)
            }
            Operation::SourcesAdd { input } => {
                let records: Vec<Record> = input.sources.into_iter().map(Record::from).collect();
                let ids = self.add_all(ResourceKind::Source, &records)?;
                Ok(json!({ "sources": ids }))
            }
            Operation::BytecodesAdd { input } => {
                let records: Vec<Record> = input.bytecodes.into_iter().map(Record::from).collect();
                let ids = self.add_all(ResourceKind::Bytecode, &records)?;
                Ok(json!({ "bytecodes": ids }))
            }
            Operation::CompilationsAdd { input } => {
                let records = input
                    .compilations
                    .into_iter()
                    .map(compilation_record)
                    .collect::<SdkResult<Vec<_>>>()?;
                let ids = self.add_all(ResourceKind::Compilation, &records)?;
                Ok(json!({ "compilations": ids }))
            }
            Operation::ArtifactsLoad { input } => self.artifacts_load(input),
        }
    }

    fn add_all(&self, kind: ResourceKind, records: &[Record]) -> SdkResult<Vec<NodeRef>> {
        let ids = self.store.add_batch(records)?;
        Ok(ids
            .iter()
            .map(|id| NodeRef {
                id: global_id_of(kind, id),
            })
            .collect())
    }

    fn artifacts_load(&self, input: ArtifactsLoadInput) -> SdkResult<Value> {
        let mut raws = input.artifacts;
        if let Some(dir) = &self.build_dir {
            raws.extend(read_artifacts_dir(dir)?);
        }
        let loaded = self.load_artifacts(raws)?;
        let compilations: Vec<NodeRef> = {
            let mut ids: Vec<ContentId> = Vec::new();
            for id in loaded.iter().filter_map(|(_, id)| *id) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids.iter()
                .map(|id| NodeRef {
                    id: global_id_of(ResourceKind::Compilation, id),
                })
                .collect()
        };
        let contracts: Vec<&str> = loaded.iter().map(|(name, _)| name.as_str()).collect();
        Ok(json!({
            "success": true,
            "contracts": contracts,
            "compilations": compilations,
        }))
    }

    /// Load one artifact and register its contract.
    pub fn load_artifact(&self, raw: RawArtifact) -> SdkResult<Arc<Contract>> {
        let loaded = Loader::new(self.store.as_ref()).load_artifact(raw)?;
        self.register(loaded.contract)
    }

    /// Load a batch of artifacts, returning each contract's name and
    /// compilation id.
    pub fn load_artifacts(&self, raws: Vec<RawArtifact>) -> SdkResult<Vec<(String, Option<ContentId>)>> {
        let loaded = Loader::new(self.store.as_ref()).load_artifacts(raws)?;
        loaded
            .into_iter()
            .map(|artifact| {
                let compilation = artifact.compilation;
                let contract = self.register(artifact.contract)?;
                Ok((contract.name().to_string(), compilation))
            })
            .collect()
    }

    fn register(&self, contract: Contract) -> SdkResult<Arc<Contract>> {
        let contract = Arc::new(contract);
        let mut contracts = self
            .contracts
            .write()
            .map_err(|e| SdkError::Internal(format!("contracts lock poisoned: {e}")))?;
        if contracts
            .insert(contract.name().to_string(), Arc::clone(&contract))
            .is_some()
        {
            info!(contract = contract.name(), "replaced loaded contract");
        }
        Ok(contract)
    }

    /// A loaded contract by name.
    pub fn contract(&self, name: &str) -> SdkResult<Arc<Contract>> {
        let contracts = self
            .contracts
            .read()
            .map_err(|e| SdkError::Internal(format!("contracts lock poisoned: {e}")))?;
        contracts
            .get(name)
            .cloned()
            .ok_or_else(|| SdkError::ContractNotFound(name.to_string()))
    }

    /// Names of the loaded contracts, sorted.
    pub fn contract_names(&self) -> SdkResult<Vec<String>> {
        let contracts = self
            .contracts
            .read()
            .map_err(|e| SdkError::Internal(format!("contracts lock poisoned: {e}")))?;
        Ok(contracts.keys().cloned().collect())
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

fn to_value(value: impl Serialize) -> SdkResult<Value> {
    serde_json::to_value(value).map_err(|e| SdkError::Internal(e.to_string()))
}

/// Resolve a compilation's source global ids into store ids.
fn compilation_record(input: CompilationInput) -> SdkResult<Record> {
    let sources = input
        .sources
        .iter()
        .map(|source| {
            let global = decode(&source.id)?;
            if global.type_name != ResourceKind::Source.as_str() {
                return Err(SdkError::Validation(format!(
                    "compilation source {} is a {} id",
                    source.id, global.type_name
                )));
            }
            ContentId::from_hex(&global.id)
                .map_err(|e| SdkError::Validation(format!("compilation source {}: {e}", source.id)))
        })
        .collect::<SdkResult<Vec<_>>>()?;
    Ok(Compilation::new(input.compiler, sources).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use adb_types::{Address, NetworkId};

    fn add_source(db: &Db, contents: &str) -> String {
        let response = db.execute(
            r#"{"op": "sourcesAdd", "input": {"sources": [{"contents": "$contents", "sourcePath": "$sourcePath"}]}}"#,
            &json!({"contents": contents}),
        );
        assert!(response.is_ok(), "{:?}", response.errors);
        response.data.unwrap()["sourcesAdd"]["sources"][0]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn add_then_fetch_source() {
        let db = Db::new();
        let id = add_source(&db, "contract A {}");

        let response = db.query(r#"{"op": "source", "id": "$id"}"#, &json!({"id": id}));
        let data = response.data.unwrap();
        assert_eq!(data["source"]["contents"], "contract A {}");
        assert_eq!(data["source"]["id"], id.as_str());

        let response = db.execute(Operation::Node { id: id.clone() }, &Value::Null);
        assert_eq!(response.data.unwrap()["node"]["__typename"], "Source");
    }

    #[test]
    fn adding_twice_returns_same_id() {
        let db = Db::new();
        let first = add_source(&db, "contract A {}");
        let second = add_source(&db, "contract A {}");
        assert_eq!(first, second);
        assert_eq!(db.store().count(ResourceKind::Source).unwrap(), 1);
    }

    #[test]
    fn bytecodes_add_is_batched() {
        let db = Db::new();
        let response = db.execute(
            r#"{"op": "bytecodesAdd", "input": {"bytecodes": [{"bytes": "0x01"}, {"bytes": "0x02"}]}}"#,
            &Value::Null,
        );
        let data = response.data.unwrap();
        assert_eq!(data["bytecodesAdd"]["bytecodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn compilation_round_trip_through_global_ids() {
        let db = Db::new();
        let a = add_source(&db, "contract A {}");
        let b = add_source(&db, "contract B {}");

        let response = db.execute(
            r#"{"op": "compilationsAdd", "input": {"compilations": ["$compilation"]}}"#,
            &json!({
                "compilation": {
                    "compiler": {"name": "solc", "version": "0.5.0"},
                    "sources": [{"id": a}, {"id": b}]
                }
            }),
        );
        let data = response.data.unwrap();
        let compilation_id = data["compilationsAdd"]["compilations"][0]["id"].as_str().unwrap();

        let response = db.execute(
            r#"{"op": "compilationSources", "id": "$id", "args": {"first": 1}}"#,
            &json!({"id": compilation_id}),
        );
        let data = response.data.unwrap();
        let page = &data["compilationSources"];
        assert_eq!(page["edges"][0]["node"]["contents"], "contract A {}");
        assert_eq!(page["pageInfo"]["hasNextPage"], true);
    }

    #[test]
    fn compilation_with_unknown_source_is_validation_error() {
        let db = Db::new();
        let missing = global_id_of(ResourceKind::Source, &ContentId::null());
        let response = db.execute(
            r#"{"op": "compilationsAdd", "input": {"compilations": [{"compiler": {"name": "solc", "version": "0.5.0"}, "sources": [{"id": "$id"}]}]}}"#,
            &json!({"id": missing}),
        );
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].kind, ErrorKind::Validation);
    }

    #[test]
    fn error_kinds_are_reported() {
        let db = Db::new();

        let response = db.execute(r#"{"op": "node", "id": "***"}"#, &Value::Null);
        assert_eq!(response.errors[0].kind, ErrorKind::Decode);

        let unknown = adb_graph::encode("Source", &ContentId::null().to_hex());
        let response = db.execute(Operation::Node { id: unknown }, &Value::Null);
        assert_eq!(response.errors[0].kind, ErrorKind::NotFound);

        let response = db.execute(r#"{"op": "sources", "args": {"first": -1}}"#, &Value::Null);
        assert_eq!(response.errors[0].kind, ErrorKind::Validation);

        let response = db.execute("{", &Value::Null);
        assert_eq!(response.errors[0].kind, ErrorKind::Validation);
    }

    #[test]
    fn artifacts_load_registers_contracts() {
        let db = Db::new();
        let response = db.execute(
            Operation::ArtifactsLoad {
                input: ArtifactsLoadInput {
                    artifacts: vec![
                        serde_json::from_value(json!({
                            "contractName": "MetaCoin",
                            "bytecode": "0x6080",
                            "deployedBytecode": "0x6080",
                            "source": "contract MetaCoin {}",
                            "compiler": {"name": "solc", "version": "0.5.0"},
                            "networks": {"5777": {"address": "0x1"}}
                        }))
                        .unwrap(),
                    ],
                },
            },
            &Value::Null,
        );
        let data = response.data.unwrap();
        assert_eq!(data["artifactsLoad"]["success"], true);
        assert_eq!(data["artifactsLoad"]["contracts"][0], "MetaCoin");
        assert_eq!(data["artifactsLoad"]["compilations"].as_array().unwrap().len(), 1);

        let contract = db.contract("MetaCoin").unwrap();
        assert_eq!(
            contract.address(Some(&NetworkId::from("5777"))).unwrap(),
            Address::parse("0x1").unwrap()
        );
        assert_eq!(db.contract_names().unwrap(), ["MetaCoin"]);
    }

    #[test]
    fn unprefixed_deployed_bytecode_reads_back_prefixed() {
        let db = Db::new();
        let loaded = Loader::new(db.store().as_ref())
            .load_artifact(serde_json::from_value(json!({"deployedBytecode": "6080"})).unwrap())
            .unwrap();
        let id = global_id_of(ResourceKind::Bytecode, &loaded.deployed_bytecode.unwrap());

        let response = db.execute(r#"{"op": "bytecode", "id": "$id"}"#, &json!({"id": id}));
        assert_eq!(response.data.unwrap()["bytecode"]["bytes"], "0x6080");
        let response = db.execute(Operation::Node { id }, &Value::Null);
        assert_eq!(response.data.unwrap()["node"]["bytes"], "0x6080");
    }

    #[test]
    fn artifacts_load_reads_only_the_build_dir() {
        let build = tempfile::tempdir().unwrap();
        std::fs::write(
            build.path().join("MetaCoin.json"),
            r#"{"contractName": "MetaCoin", "bytecode": "0x6080", "source": "contract MetaCoin {}"}"#,
        )
        .unwrap();
        let other = tempfile::tempdir().unwrap();
        std::fs::write(
            other.path().join("Private.json"),
            r#"{"contractName": "Private", "bytecode": "0x6080", "source": "secret text"}"#,
        )
        .unwrap();

        let db = Db::new().with_build_dir(build.path());
        let response = db.execute(
            r#"{"op": "artifactsLoad", "input": {"directory": "$dir"}}"#,
            &json!({"dir": other.path()}),
        );
        assert_eq!(response.errors[0].kind, ErrorKind::Validation);
        assert!(db.contract_names().unwrap().is_empty());

        let response = db.execute(r#"{"op": "artifactsLoad"}"#, &Value::Null);
        let data = response.data.unwrap();
        assert_eq!(data["artifactsLoad"]["contracts"], json!(["MetaCoin"]));
        assert!(db.contract("Private").is_err());
    }

    #[test]
    fn artifacts_load_without_build_dir_loads_inline_only() {
        let db = Db::new();
        assert!(db.build_dir().is_none());
        let response = db.execute(r#"{"op": "artifactsLoad", "input": {}}"#, &Value::Null);
        let data = response.data.unwrap();
        assert_eq!(data["artifactsLoad"]["contracts"], json!([]));
        assert!(db.load_build_dir().unwrap().is_empty());
    }

    #[test]
    fn unknown_contract_is_not_found() {
        let err = Db::new().contract("Nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn concurrent_adds_share_one_store() {
        use std::thread;

        let db = Arc::new(Db::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || add_source(&db, &format!("contract C{} {{}}", i % 4)))
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(db.store().count(ResourceKind::Source).unwrap(), 4);
    }
}
