//! Per-network deployment records.
//!
//! A [`NetworkOverlay`] holds one [`NetworkRecord`] per network id a
//! contract has been deployed to (or configured for). Reads come in two
//! strengths:
//!
//! - strict ([`NetworkOverlay::resolve`], [`NetworkOverlay::address`],
//!   [`NetworkOverlay::transaction_hash`]) fail when the network id is unset
//!   or has no record, and `address` additionally fails when the record has
//!   no address;
//! - lenient ([`NetworkOverlay::links`], [`NetworkOverlay::events`]) return
//!   an empty map when the record is missing.
//!
//! Writes that create state ([`NetworkOverlay::set_address`],
//! [`NetworkOverlay::set_link`], [`NetworkOverlay::record_event`]) upsert the
//! record under the overlay's write lock, starting from
//! [`NetworkRecord::default`] (no address, empty links and events).

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use adb_types::{AbiEntry, Address, NetworkId, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{ContractError, ContractResult};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deployment data for one network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: BTreeMap<String, Address>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: BTreeMap<String, AbiEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The mutable per-network side of a contract.
#[derive(Debug)]
pub struct NetworkOverlay {
    contract_name: String,
    records: RwLock<BTreeMap<NetworkId, NetworkRecord>>,
}

impl NetworkOverlay {
    /// An overlay with no network records.
    pub fn new(contract_name: impl Into<String>) -> Self {
        Self::with_records(contract_name, BTreeMap::new())
    }

    /// An overlay seeded with existing records (e.g. from a build artifact).
    pub fn with_records(
        contract_name: impl Into<String>,
        records: BTreeMap<NetworkId, NetworkRecord>,
    ) -> Self {
        Self {
            contract_name: contract_name.into(),
            records: RwLock::new(records),
        }
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    // ---- Strict reads ----

    /// The record for `network_id`.
    ///
    /// Fails with [`ContractError::NetworkIdNotSet`] when no id is given and
    /// with [`ContractError::NoNetworkConfiguration`] when the id has no
    /// record.
    pub fn resolve(&self, network_id: Option<&NetworkId>) -> ContractResult<NetworkRecord> {
        let network_id = self.require_network_id(network_id)?;
        let records = self.read_records()?;
        records
            .get(network_id)
            .cloned()
            .ok_or_else(|| self.no_configuration(network_id))
    }

    /// The deployed address on `network_id`.
    ///
    /// A record without an address is [`ContractError::NotDeployed`], which
    /// is a different failure from having no record at all.
    pub fn address(&self, network_id: Option<&NetworkId>) -> ContractResult<Address> {
        self.resolve(network_id)?
            .address
            .ok_or_else(|| ContractError::NotDeployed {
                contract: self.contract_name.clone(),
            })
    }

    pub fn transaction_hash(&self, network_id: Option<&NetworkId>) -> ContractResult<Option<TxHash>> {
        Ok(self.resolve(network_id)?.transaction_hash)
    }

    /// `updatedAt` of the record, if the record exists and carries one.
    pub fn updated_at(&self, network_id: Option<&NetworkId>) -> Option<DateTime<Utc>> {
        self.resolve(network_id).ok().and_then(|r| r.updated_at)
    }

    // ---- Lenient reads ----

    /// Library links on `network_id`; empty when the id is unset or has no
    /// record.
    pub fn links(&self, network_id: Option<&NetworkId>) -> ContractResult<BTreeMap<String, Address>> {
        let Some(network_id) = network_id else {
            return Ok(BTreeMap::new());
        };
        let records = self.read_records()?;
        Ok(records
            .get(network_id)
            .map(|r| r.links.clone())
            .unwrap_or_default())
    }

    /// Recorded events on `network_id`; empty when the id is unset or has no
    /// record.
    pub fn events(&self, network_id: Option<&NetworkId>) -> ContractResult<BTreeMap<String, AbiEntry>> {
        let Some(network_id) = network_id else {
            return Ok(BTreeMap::new());
        };
        let records = self.read_records()?;
        Ok(records
            .get(network_id)
            .map(|r| r.events.clone())
            .unwrap_or_default())
    }

    /// Whether a record exists for `network_id`.
    pub fn has_record(&self, network_id: &NetworkId) -> ContractResult<bool> {
        Ok(self.read_records()?.contains_key(network_id))
    }

    /// Network ids with a record, in sorted order.
    pub fn network_ids(&self) -> ContractResult<Vec<NetworkId>> {
        Ok(self.read_records()?.keys().cloned().collect())
    }

    /// A snapshot of all records.
    pub fn networks(&self) -> ContractResult<BTreeMap<NetworkId, NetworkRecord>> {
        Ok(self.read_records()?.clone())
    }

    // ---- Writes ----

    /// Set the deployed address, creating the record if needed.
    pub fn set_address(
        &self,
        network_id: Option<&NetworkId>,
        address: Option<Address>,
    ) -> ContractResult<()> {
        let address = address.ok_or_else(|| {
            ContractError::Validation(
                "Cannot set deployed address; malformed value: null".into(),
            )
        })?;
        self.upsert(network_id, |record| record.address = Some(address))
    }

    /// Set the deployment transaction hash. The record must already exist.
    pub fn set_transaction_hash(
        &self,
        network_id: Option<&NetworkId>,
        hash: TxHash,
    ) -> ContractResult<()> {
        let network_id = self.require_network_id(network_id)?;
        let mut records = self.write_records()?;
        let record = records
            .get_mut(network_id)
            .ok_or_else(|| self.no_configuration(network_id))?;
        record.transaction_hash = Some(hash);
        record.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Link library `name` to `address`, creating the record if needed.
    pub fn set_link(
        &self,
        network_id: Option<&NetworkId>,
        name: impl Into<String>,
        address: Address,
    ) -> ContractResult<()> {
        let name = name.into();
        self.upsert(network_id, |record| {
            record.links.insert(name, address);
        })
    }

    /// Record an event under `key` (signature or topic), creating the record
    /// if needed.
    pub fn record_event(
        &self,
        network_id: Option<&NetworkId>,
        key: impl Into<String>,
        entry: AbiEntry,
    ) -> ContractResult<()> {
        let key = key.into();
        self.upsert(network_id, |record| {
            record.events.insert(key, entry);
        })
    }

    fn upsert(
        &self,
        network_id: Option<&NetworkId>,
        apply: impl FnOnce(&mut NetworkRecord),
    ) -> ContractResult<()> {
        let network_id = self.require_network_id(network_id)?;
        let mut records = self.write_records()?;
        let record = records.entry(network_id.clone()).or_insert_with(|| {
            debug!(
                contract = %self.contract_name,
                network = %network_id,
                "creating network record"
            );
            NetworkRecord::default()
        });
        apply(record);
        record.updated_at = Some(Utc::now());
        Ok(())
    }

    // ---- Helpers ----

    fn require_network_id<'a>(&self, network_id: Option<&'a NetworkId>) -> ContractResult<&'a NetworkId> {
        network_id.ok_or_else(|| ContractError::NetworkIdNotSet {
            contract: self.contract_name.clone(),
        })
    }

    fn no_configuration(&self, network_id: &NetworkId) -> ContractError {
        ContractError::NoNetworkConfiguration {
            contract: self.contract_name.clone(),
            network_id: network_id.clone(),
        }
    }

    fn read_records(&self) -> ContractResult<RwLockReadGuard<'_, BTreeMap<NetworkId, NetworkRecord>>> {
        self.records
            .read()
            .map_err(|e| ContractError::Poisoned(e.to_string()))
    }

    fn write_records(&self) -> ContractResult<RwLockWriteGuard<'_, BTreeMap<NetworkId, NetworkRecord>>> {
        self.records
            .write()
            .map_err(|e| ContractError::Poisoned(e.to_string()))
    }
}
