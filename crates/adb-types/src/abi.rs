use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` field of an ABI entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiEntryKind {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
    Event,
    Error,
}

/// A typed parameter of an ABI entry.
///
/// Fields this crate does not interpret (`components`, `internalType`, ...)
/// are kept in `extra` and written back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            indexed: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = Some(true);
        self
    }
}

/// One entry of a contract ABI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default)]
    pub kind: AbiEntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Precomputed signature or topic, when the build step supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AbiEntry {
    /// An event entry with the given name and parameters.
    pub fn event(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            kind: AbiEntryKind::Event,
            name: Some(name.into()),
            inputs,
            signature: None,
            extra: BTreeMap::new(),
        }
    }

    /// A function entry with the given name and parameters.
    pub fn function(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            kind: AbiEntryKind::Function,
            name: Some(name.into()),
            inputs,
            signature: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn is_event(&self) -> bool {
        self.kind == AbiEntryKind::Event
    }

    /// Canonical signature: `Name(type1,type2,...)`, no spaces.
    pub fn canonical_signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.ty.as_str()).collect();
        format!("{}({})", self.name.as_deref().unwrap_or_default(), types.join(","))
    }
}
