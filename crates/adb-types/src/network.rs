use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the network a deployment lives on (e.g. `"1"`, `"5777"`).
///
/// Build artifacts key their `networks` object by the decimal network id, so
/// the id is kept as the string it arrived as.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NetworkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}
