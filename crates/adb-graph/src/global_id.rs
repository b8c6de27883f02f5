//! Opaque global ids.
//!
//! A global id is the standard base64 of `"<Type>:<id>"`. Callers treat it
//! as an opaque string; only this module looks inside.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{GraphError, GraphResult};

/// A decoded global id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalId {
    pub type_name: String,
    pub id: String,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    pub fn encode(&self) -> String {
        encode(&self.type_name, &self.id)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.id)
    }
}

/// Encode `(type_name, id)` as an opaque global id.
pub fn encode(type_name: &str, id: &str) -> String {
    STANDARD.encode(format!("{type_name}:{id}"))
}

/// Decode an opaque global id.
///
/// The type name runs up to the first `:`; everything after it is the id.
pub fn decode(opaque: &str) -> GraphResult<GlobalId> {
    let bytes = STANDARD
        .decode(opaque)
        .map_err(|e| GraphError::Decode(format!("global id {opaque:?} is not base64: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| GraphError::Decode(format!("global id {opaque:?} is not UTF-8")))?;
    let (type_name, id) = text
        .split_once(':')
        .ok_or_else(|| GraphError::Decode(format!("global id {opaque:?} has no type separator")))?;
    if type_name.is_empty() {
        return Err(GraphError::Decode(format!("global id {opaque:?} has an empty type")));
    }
    Ok(GlobalId::new(type_name, id))
}
