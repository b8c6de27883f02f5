use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum number of hex digits in an address (20 bytes).
pub const ADDRESS_HEX_DIGITS: usize = 40;

/// Maximum number of hex digits in a transaction hash (32 bytes).
pub const TX_HASH_HEX_DIGITS: usize = 64;

fn hex_body(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn is_hex_digits(body: &str) -> bool {
    !body.is_empty() && body.chars().all(|c| c.is_ascii_hexdigit())
}

/// A deployed contract or library address.
///
/// Addresses are kept exactly as they were supplied (`"0x1"` reads back as
/// `"0x1"`). Validation only requires hex digits, at most 20 bytes of them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string, with or without `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let body = hex_body(s);
        if !is_hex_digits(body) || body.len() > ADDRESS_HEX_DIGITS {
            return Err(TypeError::InvalidAddress(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// The address as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> String {
        hex_body(&self.0).to_ascii_lowercase()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Hash of the transaction that deployed a contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Parse and validate a transaction hash string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let body = hex_body(s);
        if !is_hex_digits(body) || body.len() > TX_HASH_HEX_DIGITS {
            return Err(TypeError::InvalidTxHash(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TxHash {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.0
    }
}
