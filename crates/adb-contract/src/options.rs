use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// How numeric return values are presented to callers of the contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    BigNumber,
    #[default]
    BN,
    String,
}

impl NumberFormat {
    pub const ALLOWED: [&'static str; 3] = ["BigNumber", "BN", "String"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigNumber => "BigNumber",
            Self::BN => "BN",
            Self::String => "String",
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberFormat {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BigNumber" => Ok(Self::BigNumber),
            "BN" => Ok(Self::BN),
            "String" => Ok(Self::String),
            other => Err(ContractError::Validation(format!(
                "Invalid number format setting: \"{other}\": valid formats are: {:?}.",
                Self::ALLOWED
            ))),
        }
    }
}

/// Contract-abstraction settings carried alongside an artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractOptions {
    pub number_format: NumberFormat,
    pub gas_multiplier: f64,
    pub auto_gas: bool,
    pub timeout_blocks: Option<u64>,
}

impl Default for ContractOptions {
    fn default() -> Self {
        Self {
            number_format: NumberFormat::BN,
            gas_multiplier: 1.25,
            auto_gas: true,
            timeout_blocks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ContractOptions::default();
        assert_eq!(options.number_format, NumberFormat::BN);
        assert_eq!(options.gas_multiplier, 1.25);
        assert!(options.auto_gas);
        assert!(options.timeout_blocks.is_none());
    }

    #[test]
    fn parses_allowed_formats() {
        for name in NumberFormat::ALLOWED {
            assert_eq!(name.parse::<NumberFormat>().unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "Decimal".parse::<NumberFormat>().unwrap_err();
        assert!(matches!(err, ContractError::Validation(_)));
        let msg = err.to_string();
        assert!(msg.contains("\"Decimal\""));
        assert!(msg.contains("BigNumber"));
    }
}
