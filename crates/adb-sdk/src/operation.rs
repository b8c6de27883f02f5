//! Query documents.
//!
//! A document is one operation, either already built or as JSON text such
//! as `{"op": "sources", "args": {"first": 2}}`. String values of the form
//! `"$name"` are replaced by the matching variable before the operation is
//! decoded; an undefined variable becomes `null`.

use adb_contract::RawArtifact;
use adb_graph::{ConnectionArgs, NodeRef};
use adb_store::{Bytecode, CompilerInfo, Source};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SdkError, SdkResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    Node {
        id: String,
    },
    Source {
        id: String,
    },
    Bytecode {
        id: String,
    },
    Compilation {
        id: String,
    },
    Sources {
        #[serde(default)]
        args: ConnectionArgs,
    },
    Bytecodes {
        #[serde(default)]
        args: ConnectionArgs,
    },
    Compilations {
        #[serde(default)]
        args: ConnectionArgs,
    },
    CompilationSources {
        id: String,
        #[serde(default)]
        args: ConnectionArgs,
    },
    SourcesAdd {
        input: SourcesAddInput,
    },
    BytecodesAdd {
        input: BytecodesAddInput,
    },
    CompilationsAdd {
        input: CompilationsAddInput,
    },
    ArtifactsLoad {
        #[serde(default)]
        input: ArtifactsLoadInput,
    },
}

impl Operation {
    /// The field the result is reported under in `Response.data`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Node { .. } => "node",
            Self::Source { .. } => "source",
            Self::Bytecode { .. } => "bytecode",
            Self::Compilation { .. } => "compilation",
            Self::Sources { .. } => "sources",
            Self::Bytecodes { .. } => "bytecodes",
            Self::Compilations { .. } => "compilations",
            Self::CompilationSources { .. } => "compilationSources",
            Self::SourcesAdd { .. } => "sourcesAdd",
            Self::BytecodesAdd { .. } => "bytecodesAdd",
            Self::CompilationsAdd { .. } => "compilationsAdd",
            Self::ArtifactsLoad { .. } => "artifactsLoad",
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SourcesAdd { .. }
                | Self::BytecodesAdd { .. }
                | Self::CompilationsAdd { .. }
                | Self::ArtifactsLoad { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourcesAddInput {
    pub sources: Vec<Source>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BytecodesAddInput {
    pub bytecodes: Vec<Bytecode>,
}

/// A compilation to add. Sources are named by global id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompilationInput {
    pub compiler: CompilerInfo,
    pub sources: Vec<NodeRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompilationsAddInput {
    pub compilations: Vec<CompilationInput>,
}

/// Inline artifacts to load along with the database's build directory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsLoadInput {
    #[serde(default)]
    pub artifacts: Vec<RawArtifact>,
}

/// A request: JSON text or an already built operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    Text(String),
    Parsed(Operation),
}

impl Document {
    /// Apply `variables` and decode the operation.
    pub fn resolve(self, variables: &Value) -> SdkResult<Operation> {
        let value = match self {
            Self::Text(text) => serde_json::from_str(&text)
                .map_err(|e| SdkError::Validation(format!("document is not valid JSON: {e}")))?,
            Self::Parsed(operation) => {
                if variables_are_empty(variables) {
                    return Ok(operation);
                }
                serde_json::to_value(&operation).map_err(|e| SdkError::Internal(e.to_string()))?
            }
        };
        let empty = Map::new();
        let variables = match variables {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(SdkError::Validation("variables must be an object".into())),
        };
        serde_json::from_value(substitute(value, variables))
            .map_err(|e| SdkError::Validation(format!("invalid operation: {e}")))
    }
}

fn variables_are_empty(variables: &Value) -> bool {
    match variables {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn substitute(value: Value, variables: &Map<String, Value>) -> Value {
    match value {
        Value::String(s) => match s.strip_prefix('$') {
            Some(name) if !name.is_empty() => variables.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::String(s),
        },
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute(item, variables))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, substitute(item, variables)))
                .collect(),
        ),
        other => other,
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Operation> for Document {
    fn from(operation: Operation) -> Self {
        Self::Parsed(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_document() {
        let op = Document::from(r#"{"op": "sources", "args": {"first": 2}}"#)
            .resolve(&Value::Null)
            .unwrap();
        assert_eq!(
            op,
            Operation::Sources {
                args: ConnectionArgs::first(2)
            }
        );
        assert_eq!(op.name(), "sources");
        assert!(!op.is_mutation());
    }

    #[test]
    fn missing_args_default_to_whole_list() {
        let op = Document::from(r#"{"op": "bytecodes"}"#).resolve(&json!({})).unwrap();
        assert_eq!(
            op,
            Operation::Bytecodes {
                args: ConnectionArgs::default()
            }
        );
    }

    #[test]
    fn substitutes_variables_in_text() {
        let doc = r#"{
            "op": "sourcesAdd",
            "input": {"sources": [{"contents": "$contents", "sourcePath": "$sourcePath"}]}
        }"#;
        let op = Document::from(doc)
            .resolve(&json!({"contents": "contract A {}"}))
            .unwrap();
        let Operation::SourcesAdd { input } = op else {
            panic!("expected sourcesAdd");
        };
        assert_eq!(input.sources, vec![Source::new("contract A {}", None)]);
    }

    #[test]
    fn substitutes_structured_variables() {
        let doc = r#"{"op": "compilationsAdd", "input": {"compilations": ["$compilation"]}}"#;
        let vars = json!({
            "compilation": {
                "compiler": {"name": "solc", "version": "0.5.0"},
                "sources": [{"id": "U291cmNlOjE="}]
            }
        });
        let op = Document::from(doc).resolve(&vars).unwrap();
        assert!(op.is_mutation());
        let Operation::CompilationsAdd { input } = op else {
            panic!("expected compilationsAdd");
        };
        assert_eq!(input.compilations[0].compiler.version, "0.5.0");
    }

    #[test]
    fn parsed_document_accepts_variables() {
        let op = Operation::Node {
            id: "$id".into(),
        };
        let resolved = Document::from(op).resolve(&json!({"id": "abc"})).unwrap();
        assert_eq!(resolved, Operation::Node { id: "abc".into() });
    }

    #[test]
    fn rejects_bad_documents() {
        for doc in ["not json", r#"{"op": "dropTables"}"#, r#"{"op": "node"}"#] {
            assert!(matches!(
                Document::from(doc).resolve(&Value::Null),
                Err(SdkError::Validation(_))
            ));
        }
        assert!(matches!(
            Document::from(r#"{"op": "artifactsLoad", "input": {"directory": "/etc"}}"#)
                .resolve(&Value::Null),
            Err(SdkError::Validation(_))
        ));
        assert!(Document::from(r#"{"op": "sources"}"#)
            .resolve(&json!([1, 2]))
            .is_err());
    }
}
