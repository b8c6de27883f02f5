use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of a content-addressed record.
///
/// The set is closed: node lookups dispatch on this tag and never inspect
/// record fields to guess a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Source,
    Bytecode,
    Compilation,
}

impl ResourceKind {
    /// All kinds, in a fixed order.
    pub const ALL: [ResourceKind; 3] = [Self::Source, Self::Bytecode, Self::Compilation];

    /// The type name used in opaque global ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Bytecode => "Bytecode",
            Self::Compilation => "Compilation",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Source" => Ok(Self::Source),
            "Bytecode" => Ok(Self::Bytecode),
            "Compilation" => Ok(Self::Compilation),
            other => Err(TypeError::UnknownResourceKind(other.to_string())),
        }
    }
}
