use std::collections::BTreeSet;

use adb_crypto::IdentityHasher;
use adb_types::{ContentId, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A contract source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub contents: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Source {
    pub fn new(contents: impl Into<String>, source_path: Option<String>) -> Self {
        Self {
            contents: contents.into(),
            source_path,
        }
    }
}

#[derive(Serialize)]
struct SourceIdentity<'a> {
    contents: &'a str,
    source_path: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Bytecode
// ---------------------------------------------------------------------------

/// A declared placeholder range inside a bytecode string.
///
/// Offsets and length count hex characters of the bytecode body (the part
/// after any `0x` prefix).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    pub offsets: BTreeSet<usize>,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LinkReference {
    pub fn new(
        name: impl Into<String>,
        offsets: impl IntoIterator<Item = usize>,
        length: usize,
    ) -> Self {
        Self {
            offsets: offsets.into_iter().collect(),
            length,
            name: Some(name.into()),
        }
    }
}

/// Hex-encoded executable payload with its link references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    pub bytes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    #[serde(default)]
    pub link_references: Vec<LinkReference>,
}

impl Bytecode {
    pub fn new(bytes: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            source_map: None,
            link_references: Vec::new(),
        }
    }

    pub fn with_source_map(mut self, source_map: impl Into<String>) -> Self {
        self.source_map = Some(source_map.into());
        self
    }

    pub fn with_link_references(mut self, link_references: Vec<LinkReference>) -> Self {
        self.link_references = link_references;
        self
    }

    /// The bytecode body without its `0x` prefix.
    pub fn body(&self) -> &str {
        self.bytes.strip_prefix("0x").unwrap_or(&self.bytes)
    }

    /// The bytecode with exactly one `0x` prefix.
    pub fn prefixed(&self) -> String {
        format!("0x{}", self.body())
    }
}

/// Source maps are derived output and do not take part in identity.
#[derive(Serialize)]
struct BytecodeIdentity<'a> {
    bytes: String,
    link_references: &'a [LinkReference],
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// The compiler that produced a compilation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub name: String,
    pub version: String,
    /// Opaque compiler settings, kept verbatim.
    #[serde(default)]
    pub settings: Value,
}

impl CompilerInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            settings: Value::Null,
        }
    }
}

/// Reference to a stored [`Source`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: ContentId,
}

/// One compiler run over an ordered set of sources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Compilation {
    pub compiler: CompilerInfo,
    pub sources: Vec<SourceRef>,
}

impl Compilation {
    pub fn new(compiler: CompilerInfo, sources: impl IntoIterator<Item = ContentId>) -> Self {
        Self {
            compiler,
            sources: sources.into_iter().map(|id| SourceRef { id }).collect(),
        }
    }
}

#[derive(Serialize)]
struct CompilationIdentity<'a> {
    compiler: &'a CompilerInfo,
    sources: &'a [SourceRef],
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A content-addressed record of one of the closed set of kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Record {
    Source(Source),
    Bytecode(Bytecode),
    Compilation(Compilation),
}

impl Record {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Source(_) => ResourceKind::Source,
            Self::Bytecode(_) => ResourceKind::Bytecode,
            Self::Compilation(_) => ResourceKind::Compilation,
        }
    }

    /// The form the record is stored in: bytecode bytes carry one `0x` prefix.
    pub fn normalized(&self) -> Record {
        match self {
            Self::Bytecode(bytecode) => Self::Bytecode(Bytecode {
                bytes: bytecode.prefixed(),
                ..bytecode.clone()
            }),
            other => other.clone(),
        }
    }

    /// Compute the content-addressed id of this record.
    ///
    /// Only identity fields are hashed, in a fixed order, through the
    /// kind's domain-separated hasher.
    pub fn compute_id(&self) -> StoreResult<ContentId> {
        let hasher = IdentityHasher::for_kind(self.kind());
        let id = match self {
            Self::Source(source) => hasher.identify(&SourceIdentity {
                contents: &source.contents,
                source_path: source.source_path.as_deref(),
            })?,
            Self::Bytecode(bytecode) => hasher.identify(&BytecodeIdentity {
                bytes: bytecode.prefixed(),
                link_references: &bytecode.link_references,
            })?,
            Self::Compilation(compilation) => hasher.identify(&CompilationIdentity {
                compiler: &compilation.compiler,
                sources: &compilation.sources,
            })?,
        };
        Ok(id)
    }

    /// Check the fields this record cannot be stored without.
    ///
    /// Cross-record checks (compilation sources exist) belong to the store.
    pub fn validate(&self) -> StoreResult<()> {
        match self {
            Self::Source(_) => Ok(()),
            Self::Bytecode(bytecode) => {
                if bytecode.body().is_empty() {
                    return Err(StoreError::Validation("bytecode bytes are empty".into()));
                }
                if let Some(r) = bytecode.link_references.iter().find(|r| r.length == 0) {
                    return Err(StoreError::Validation(format!(
                        "link reference {} has zero length",
                        r.name.as_deref().unwrap_or("<unnamed>")
                    )));
                }
                Ok(())
            }
            Self::Compilation(compilation) => {
                if compilation.compiler.name.trim().is_empty() {
                    return Err(StoreError::Validation("compiler name is empty".into()));
                }
                if compilation.compiler.version.trim().is_empty() {
                    return Err(StoreError::Validation("compiler version is empty".into()));
                }
                Ok(())
            }
        }
    }

    pub fn into_source(self) -> StoreResult<Source> {
        match self {
            Self::Source(source) => Ok(source),
            other => Err(StoreError::KindMismatch {
                expected: ResourceKind::Source,
                actual: other.kind(),
            }),
        }
    }

    pub fn into_bytecode(self) -> StoreResult<Bytecode> {
        match self {
            Self::Bytecode(bytecode) => Ok(bytecode),
            other => Err(StoreError::KindMismatch {
                expected: ResourceKind::Bytecode,
                actual: other.kind(),
            }),
        }
    }

    pub fn into_compilation(self) -> StoreResult<Compilation> {
        match self {
            Self::Compilation(compilation) => Ok(compilation),
            other => Err(StoreError::KindMismatch {
                expected: ResourceKind::Compilation,
                actual: other.kind(),
            }),
        }
    }
}

impl From<Source> for Record {
    fn from(source: Source) -> Self {
        Self::Source(source)
    }
}

impl From<Bytecode> for Record {
    fn from(bytecode: Bytecode) -> Self {
        Self::Bytecode(bytecode)
    }
}

impl From<Compilation> for Record {
    fn from(compilation: Compilation) -> Self {
        Self::Compilation(compilation)
    }
}
