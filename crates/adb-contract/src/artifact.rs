use std::collections::BTreeMap;

use adb_store::{Bytecode, CompilerInfo, Source};
use adb_types::{AbiEntry, NetworkId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContractResult;
use crate::link::detect_link_references;
use crate::network::NetworkRecord;
use crate::options::{ContractOptions, NumberFormat};

/// Name used in messages when an artifact carries no `contractName`.
pub const DEFAULT_CONTRACT_NAME: &str = "Contract";

/// A build artifact as written by the compile step.
///
/// Every field is optional. Fields ADB does not interpret (`ast`,
/// `schemaVersion`, `userdoc`, ...) are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_source_map: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerInfo>,
    #[serde(default)]
    pub networks: BTreeMap<NetworkId, NetworkRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_gas: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_blocks: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawArtifact {
    /// Parse an artifact from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The immutable part of a contract: ABI, bytecodes and compiler output.
///
/// Per-network deployment data lives in a
/// [`NetworkOverlay`](crate::NetworkOverlay) instead.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractArtifact {
    contract_name: String,
    abi: Vec<AbiEntry>,
    bytecode: Bytecode,
    deployed_bytecode: Bytecode,
    source: Option<Source>,
    compiler: Option<CompilerInfo>,
    updated_at: Option<DateTime<Utc>>,
    options: ContractOptions,
    extra: BTreeMap<String, Value>,
}

impl ContractArtifact {
    /// Build the artifact view from a raw artifact.
    ///
    /// `networks` is ignored here. Link references are detected from the
    /// placeholders left in each bytecode. Fails with a validation error when
    /// `numberFormat` is not one of the allowed formats.
    pub fn from_raw(raw: RawArtifact) -> ContractResult<Self> {
        let number_format = match raw.number_format.as_deref() {
            Some(format) => format.parse::<NumberFormat>()?,
            None => NumberFormat::default(),
        };
        let defaults = ContractOptions::default();
        let options = ContractOptions {
            number_format,
            gas_multiplier: raw.gas_multiplier.unwrap_or(defaults.gas_multiplier),
            auto_gas: raw.auto_gas.unwrap_or(defaults.auto_gas),
            timeout_blocks: raw.timeout_blocks,
        };

        let source = raw
            .source
            .map(|contents| Source::new(contents, raw.source_path));

        Ok(Self {
            contract_name: raw
                .contract_name
                .unwrap_or_else(|| DEFAULT_CONTRACT_NAME.to_string()),
            abi: raw.abi,
            bytecode: bytecode_from(raw.bytecode, raw.source_map),
            deployed_bytecode: bytecode_from(raw.deployed_bytecode, raw.deployed_source_map),
            source,
            compiler: raw.compiler,
            updated_at: raw.updated_at,
            options,
            extra: raw.extra,
        })
    }

    /// Write this artifact back out in build-artifact form.
    pub fn to_raw(&self, networks: BTreeMap<NetworkId, NetworkRecord>) -> RawArtifact {
        RawArtifact {
            contract_name: Some(self.contract_name.clone()),
            abi: self.abi.clone(),
            bytecode: Some(self.bytecode.bytes.clone()),
            deployed_bytecode: Some(self.deployed_bytes()),
            source_map: self.bytecode.source_map.clone(),
            deployed_source_map: self.deployed_bytecode.source_map.clone(),
            source: self.source.as_ref().map(|s| s.contents.clone()),
            source_path: self.source.as_ref().and_then(|s| s.source_path.clone()),
            compiler: self.compiler.clone(),
            networks,
            updated_at: self.updated_at,
            number_format: Some(self.options.number_format.to_string()),
            gas_multiplier: Some(self.options.gas_multiplier),
            auto_gas: Some(self.options.auto_gas),
            timeout_blocks: self.options.timeout_blocks,
            extra: self.extra.clone(),
        }
    }

    /// Replace the number format, validating the name.
    pub fn with_number_format(mut self, format: &str) -> ContractResult<Self> {
        self.options.number_format = format.parse()?;
        Ok(self)
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn abi(&self) -> &[AbiEntry] {
        &self.abi
    }

    /// Creation bytecode as it was built.
    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    pub fn deployed_bytecode(&self) -> &Bytecode {
        &self.deployed_bytecode
    }

    /// Deployed bytecode, always `0x`-prefixed.
    pub fn deployed_bytes(&self) -> String {
        self.deployed_bytecode.prefixed()
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn compiler(&self) -> Option<&CompilerInfo> {
        self.compiler.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn options(&self) -> &ContractOptions {
        &self.options
    }

    /// A passthrough field such as `ast` or `schemaVersion`.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

fn bytecode_from(bytes: Option<String>, source_map: Option<String>) -> Bytecode {
    let bytes = bytes.unwrap_or_else(|| "0x".to_string());
    let link_references = detect_link_references(&bytes);
    let mut bytecode = Bytecode::new(bytes).with_link_references(link_references);
    bytecode.source_map = source_map;
    bytecode
}
