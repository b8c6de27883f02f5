use std::sync::Arc;

use adb_store::{ArtifactStore, Bytecode, Compilation, CompilerInfo, LinkReference, Record, Source};
use adb_types::{ContentId, ResourceKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::{connection_from_vec, Connection, ConnectionArgs};
use crate::error::{GraphError, GraphResult};
use crate::global_id::{self, GlobalId};

/// Global id of a stored record.
pub fn global_id_of(kind: ResourceKind, id: &ContentId) -> String {
    global_id::encode(kind.as_str(), &id.to_hex())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNode {
    pub id: String,
    pub contents: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytecodeNode {
    pub id: String,
    pub bytes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    pub link_references: Vec<LinkReference>,
}

/// A reference to a node by its global id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationNode {
    pub id: String,
    pub compiler: CompilerInfo,
    pub sources: Vec<NodeRef>,
}

/// Any node, tagged with its type name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum Node {
    Source(SourceNode),
    Bytecode(BytecodeNode),
    Compilation(CompilationNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Self::Source(node) => &node.id,
            Self::Bytecode(node) => &node.id,
            Self::Compilation(node) => &node.id,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Source(_) => ResourceKind::Source,
            Self::Bytecode(_) => ResourceKind::Bytecode,
            Self::Compilation(_) => ResourceKind::Compilation,
        }
    }

    fn from_record(id: &ContentId, record: Record) -> Self {
        match record {
            Record::Source(source) => Self::Source(SourceNode::from_source(id, source)),
            Record::Bytecode(bytecode) => Self::Bytecode(BytecodeNode::from_bytecode(id, bytecode)),
            Record::Compilation(compilation) => {
                Self::Compilation(CompilationNode::from_compilation(id, compilation))
            }
        }
    }
}

impl SourceNode {
    fn from_source(id: &ContentId, source: Source) -> Self {
        Self {
            id: global_id_of(ResourceKind::Source, id),
            contents: source.contents,
            source_path: source.source_path,
        }
    }
}

impl BytecodeNode {
    fn from_bytecode(id: &ContentId, bytecode: Bytecode) -> Self {
        Self {
            id: global_id_of(ResourceKind::Bytecode, id),
            bytes: bytecode.bytes,
            source_map: bytecode.source_map,
            link_references: bytecode.link_references,
        }
    }
}

impl CompilationNode {
    fn from_compilation(id: &ContentId, compilation: Compilation) -> Self {
        Self {
            id: global_id_of(ResourceKind::Compilation, id),
            compiler: compilation.compiler,
            sources: compilation
                .sources
                .iter()
                .map(|source| NodeRef {
                    id: global_id_of(ResourceKind::Source, &source.id),
                })
                .collect(),
        }
    }
}

/// Read-side resolution of opaque ids and paginated lists.
#[derive(Clone)]
pub struct GraphResolver {
    store: Arc<dyn ArtifactStore>,
}

impl GraphResolver {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Resolve any opaque id to its node.
    ///
    /// Malformed ids are decode errors. A well-formed id naming an unknown
    /// type, an unparsable internal id, or a record that is not stored are
    /// all reported as not found.
    pub fn node(&self, opaque: &str) -> GraphResult<Node> {
        let GlobalId { type_name, id } = global_id::decode(opaque)?;
        let not_found = || GraphError::NotFound(format!("no node with id {opaque}"));

        let kind: ResourceKind = type_name.parse().map_err(|_| not_found())?;
        let id = ContentId::from_hex(&id).map_err(|_| not_found())?;
        if !self.store.contains(kind, &id)? {
            debug!(%kind, %id, "node lookup missed");
            return Err(not_found());
        }
        let record = self.store.get(kind, &id)?;
        Ok(Node::from_record(&id, record))
    }

    pub fn source(&self, opaque: &str) -> GraphResult<SourceNode> {
        let id = self.typed_id(opaque, ResourceKind::Source)?;
        Ok(SourceNode::from_source(&id, self.store.source(&id)?))
    }

    pub fn bytecode(&self, opaque: &str) -> GraphResult<BytecodeNode> {
        let id = self.typed_id(opaque, ResourceKind::Bytecode)?;
        Ok(BytecodeNode::from_bytecode(&id, self.store.bytecode(&id)?))
    }

    pub fn compilation(&self, opaque: &str) -> GraphResult<CompilationNode> {
        let id = self.typed_id(opaque, ResourceKind::Compilation)?;
        Ok(CompilationNode::from_compilation(&id, self.store.compilation(&id)?))
    }

    pub fn sources(&self, args: &ConnectionArgs) -> GraphResult<Connection<SourceNode>> {
        self.list(ResourceKind::Source, args)?.try_map(|node| match node {
            Node::Source(source) => Ok(source),
            other => Err(mismatch(ResourceKind::Source, &other)),
        })
    }

    pub fn bytecodes(&self, args: &ConnectionArgs) -> GraphResult<Connection<BytecodeNode>> {
        self.list(ResourceKind::Bytecode, args)?.try_map(|node| match node {
            Node::Bytecode(bytecode) => Ok(bytecode),
            other => Err(mismatch(ResourceKind::Bytecode, &other)),
        })
    }

    pub fn compilations(&self, args: &ConnectionArgs) -> GraphResult<Connection<CompilationNode>> {
        self.list(ResourceKind::Compilation, args)?.try_map(|node| match node {
            Node::Compilation(compilation) => Ok(compilation),
            other => Err(mismatch(ResourceKind::Compilation, &other)),
        })
    }

    /// A compilation's sources as full records, in compilation order.
    pub fn compilation_sources(
        &self,
        opaque: &str,
        args: &ConnectionArgs,
    ) -> GraphResult<Connection<SourceNode>> {
        let id = self.typed_id(opaque, ResourceKind::Compilation)?;
        let compilation = self.store.compilation(&id)?;
        let sources = compilation
            .sources
            .iter()
            .map(|source| Ok(SourceNode::from_source(&source.id, self.store.source(&source.id)?)))
            .collect::<GraphResult<Vec<_>>>()?;
        connection_from_vec(sources, args)
    }

    fn list(&self, kind: ResourceKind, args: &ConnectionArgs) -> GraphResult<Connection<Node>> {
        let nodes = self
            .store
            .list(kind)?
            .into_iter()
            .map(|(id, record)| Node::from_record(&id, record))
            .collect();
        connection_from_vec(nodes, args)
    }

    /// Decode an opaque id that must name a record of `kind`.
    fn typed_id(&self, opaque: &str, kind: ResourceKind) -> GraphResult<ContentId> {
        let GlobalId { type_name, id } = global_id::decode(opaque)?;
        if type_name != kind.as_str() {
            return Err(GraphError::NotFound(format!(
                "{opaque} is a {type_name} id, expected {kind}"
            )));
        }
        ContentId::from_hex(&id)
            .map_err(|_| GraphError::NotFound(format!("no {kind} with id {opaque}")))
    }
}

impl std::fmt::Debug for GraphResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphResolver").finish_non_exhaustive()
    }
}

fn mismatch(expected: ResourceKind, node: &Node) -> GraphError {
    GraphError::Store(adb_store::StoreError::KindMismatch {
        expected,
        actual: node.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adb_store::InMemoryArtifactStore;

    fn resolver() -> GraphResolver {
        GraphResolver::new(Arc::new(InMemoryArtifactStore::new()))
    }

    fn add(resolver: &GraphResolver, record: impl Into<Record>) -> ContentId {
        resolver.store().add(&record.into()).unwrap()
    }

    #[test]
    fn node_dispatches_on_type() {
        let r = resolver();
        let source_id = add(&r, Source::new("contract A {}", None));
        let bytecode_id = add(&r, Bytecode::new("0x6080"));

        let node = r.node(&global_id_of(ResourceKind::Source, &source_id)).unwrap();
        assert!(matches!(node, Node::Source(ref s) if s.contents == "contract A {}"));

        let node = r.node(&global_id_of(ResourceKind::Bytecode, &bytecode_id)).unwrap();
        assert_eq!(node.kind(), ResourceKind::Bytecode);
        assert_eq!(node.id(), global_id_of(ResourceKind::Bytecode, &bytecode_id));
    }

    #[test]
    fn node_not_found_cases() {
        let r = resolver();
        let id = add(&r, Source::new("x", None));

        let unknown_type = global_id::encode("Contract", &id.to_hex());
        let bad_internal = global_id::encode("Source", "42");
        let missing = global_id::encode("Bytecode", &id.to_hex());

        for opaque in [unknown_type, bad_internal, missing] {
            assert!(matches!(r.node(&opaque), Err(GraphError::NotFound(_))));
        }
    }

    #[test]
    fn node_malformed_id_is_decode_error() {
        assert!(matches!(resolver().node("%%%"), Err(GraphError::Decode(_))));
    }

    #[test]
    fn typed_accessor_rejects_other_kind() {
        let r = resolver();
        let id = add(&r, Source::new("x", None));
        let opaque = global_id_of(ResourceKind::Source, &id);
        assert!(r.source(&opaque).is_ok());
        let err = r.bytecode(&opaque).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn typed_accessor_missing_record_is_not_found() {
        let r = resolver();
        let opaque = global_id_of(ResourceKind::Bytecode, &ContentId::null());
        assert!(r.bytecode(&opaque).unwrap_err().is_not_found());
    }

    #[test]
    fn five_sources_first_two() {
        let r = resolver();
        for i in 0..5 {
            add(&r, Source::new(format!("contract C{i} {{}}"), None));
        }

        let page = r.sources(&ConnectionArgs::first(2)).unwrap();
        assert_eq!(page.edges.len(), 2);
        assert!(page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);
        assert_eq!(page.edges[0].node.contents, "contract C0 {}");
        assert!(page.edges[0].cursor < page.edges[1].cursor);
    }

    #[test]
    fn compilation_sources_resolve_in_order() {
        let r = resolver();
        let a = add(&r, Source::new("contract A {}", None));
        let b = add(&r, Source::new("contract B {}", None));
        let compilation_id = add(
            &r,
            Compilation::new(CompilerInfo::new("solc", "0.5.0"), [b, a]),
        );
        let opaque = global_id_of(ResourceKind::Compilation, &compilation_id);

        let compilation = r.compilation(&opaque).unwrap();
        assert_eq!(compilation.sources[0].id, global_id_of(ResourceKind::Source, &b));

        let page = r.compilation_sources(&opaque, &ConnectionArgs::default()).unwrap();
        let contents: Vec<&str> = page.nodes().map(|s| s.contents.as_str()).collect();
        assert_eq!(contents, ["contract B {}", "contract A {}"]);

        let page = r.compilation_sources(&opaque, &ConnectionArgs::last(1)).unwrap();
        assert_eq!(page.edges[0].node.contents, "contract A {}");
        assert!(page.page_info.has_previous_page);
    }

    #[test]
    fn bytecodes_and_compilations_paginate_independently() {
        let r = resolver();
        add(&r, Bytecode::new("0x01"));
        add(&r, Bytecode::new("0x02"));
        assert_eq!(r.bytecodes(&ConnectionArgs::default()).unwrap().edges.len(), 2);
        assert!(r.compilations(&ConnectionArgs::default()).unwrap().edges.is_empty());
    }

    #[test]
    fn node_serializes_with_typename() {
        let r = resolver();
        let id = add(&r, Source::new("x", Some("X.sol".into())));
        let node = r.node(&global_id_of(ResourceKind::Source, &id)).unwrap();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["__typename"], "Source");
        assert_eq!(json["sourcePath"], "X.sol");
    }
}
