use std::collections::BTreeMap;

use adb_types::{AbiEntry, Address, NetworkId};
use chrono::{DateTime, Utc};

use crate::artifact::{ContractArtifact, RawArtifact};
use crate::error::ContractResult;
use crate::events::merge_events;
use crate::link::link_bytecode;
use crate::network::NetworkOverlay;

/// A contract artifact together with its per-network deployments.
///
/// Reads that depend on a network take the network id explicitly.
#[derive(Debug)]
pub struct Contract {
    artifact: ContractArtifact,
    networks: NetworkOverlay,
}

impl Contract {
    pub fn new(artifact: ContractArtifact, networks: NetworkOverlay) -> Self {
        Self { artifact, networks }
    }

    /// Split a raw artifact into its immutable part and its network records.
    pub fn from_raw(mut raw: RawArtifact) -> ContractResult<Self> {
        let records = std::mem::take(&mut raw.networks);
        let artifact = ContractArtifact::from_raw(raw)?;
        let networks = NetworkOverlay::with_records(artifact.contract_name(), records);
        Ok(Self::new(artifact, networks))
    }

    /// The artifact in build-artifact form, with a snapshot of its networks.
    pub fn to_raw(&self) -> ContractResult<RawArtifact> {
        Ok(self.artifact.to_raw(self.networks.networks()?))
    }

    pub fn name(&self) -> &str {
        self.artifact.contract_name()
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn networks(&self) -> &NetworkOverlay {
        &self.networks
    }

    pub fn address(&self, network_id: Option<&NetworkId>) -> ContractResult<Address> {
        self.networks.address(network_id)
    }

    pub fn links(&self, network_id: Option<&NetworkId>) -> ContractResult<BTreeMap<String, Address>> {
        self.networks.links(network_id)
    }

    /// ABI events merged over the network's recorded events.
    pub fn events(&self, network_id: Option<&NetworkId>) -> ContractResult<BTreeMap<String, AbiEntry>> {
        let recorded = self.networks.events(network_id)?;
        Ok(merge_events(self.artifact.abi(), recorded))
    }

    /// Creation bytecode linked against the network's libraries.
    pub fn binary(&self, network_id: Option<&NetworkId>) -> ContractResult<String> {
        let bytecode = self.artifact.bytecode();
        let links = self.networks.links(network_id)?;
        Ok(link_bytecode(&bytecode.bytes, &bytecode.link_references, &links))
    }

    /// Deployed bytecode linked against the network's libraries.
    pub fn deployed_binary(&self, network_id: Option<&NetworkId>) -> ContractResult<String> {
        let bytecode = self.artifact.deployed_bytecode();
        let links = self.networks.links(network_id)?;
        Ok(link_bytecode(
            &self.artifact.deployed_bytes(),
            &bytecode.link_references,
            &links,
        ))
    }

    /// The network record's `updatedAt`, falling back to the artifact's.
    pub fn updated_at(&self, network_id: Option<&NetworkId>) -> Option<DateTime<Utc>> {
        self.networks
            .updated_at(network_id)
            .or_else(|| self.artifact.updated_at())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::PLACEHOLDER_LENGTH;
    use adb_types::AbiParam;

    const LIB: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn placeholder(name: &str) -> String {
        format!("__{name}{}", "_".repeat(PLACEHOLDER_LENGTH - 2 - name.len()))
    }

    fn metacoin() -> Contract {
        let raw = RawArtifact {
            contract_name: Some("MetaCoin".into()),
            abi: vec![AbiEntry::event(
                "Transfer",
                vec![
                    AbiParam::new("from", "address").indexed(),
                    AbiParam::new("to", "address").indexed(),
                    AbiParam::new("value", "uint256"),
                ],
            )],
            bytecode: Some(format!("0x6080{}00", placeholder("ConvertLib"))),
            deployed_bytecode: Some(format!("6080{}", placeholder("ConvertLib"))),
            updated_at: Some(DateTime::from_timestamp(0, 0).unwrap()),
            ..RawArtifact::default()
        };
        Contract::from_raw(raw).unwrap()
    }

    #[test]
    fn binary_is_linked_with_network_links() {
        let contract = metacoin();
        let net = NetworkId::from("1");
        contract
            .networks()
            .set_link(Some(&net), "ConvertLib", Address::parse(LIB).unwrap())
            .unwrap();

        let binary = contract.binary(Some(&net)).unwrap();
        assert_eq!(binary, format!("0x6080{}00", &LIB[2..]));

        let deployed = contract.deployed_binary(Some(&net)).unwrap();
        assert_eq!(deployed, format!("0x6080{}", &LIB[2..]));
    }

    #[test]
    fn binary_without_links_keeps_placeholders() {
        let contract = metacoin();
        let binary = contract.binary(Some(&NetworkId::from("1"))).unwrap();
        assert!(binary.contains("__ConvertLib"));
    }

    #[test]
    fn binary_without_network_id_is_unlinked() {
        let contract = metacoin();
        assert_eq!(
            contract.binary(None).unwrap(),
            format!("0x6080{}00", placeholder("ConvertLib"))
        );
        assert_eq!(
            contract.deployed_binary(None).unwrap(),
            format!("0x6080{}", placeholder("ConvertLib"))
        );
        assert!(contract.links(None).unwrap().is_empty());
    }

    #[test]
    fn events_merge_abi_over_recorded() {
        let contract = metacoin();
        let net = NetworkId::from("1");
        contract
            .networks()
            .record_event(Some(&net), "0xabc", AbiEntry::event("Old", vec![]))
            .unwrap();

        let events = contract.events(Some(&net)).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.contains_key("0xabc"));

        assert_eq!(contract.events(None).unwrap().len(), 1);
    }

    #[test]
    fn updated_at_falls_back_to_artifact() {
        let contract = metacoin();
        let net = NetworkId::from("1");
        assert_eq!(contract.updated_at(None), DateTime::from_timestamp(0, 0));
        assert_eq!(contract.updated_at(Some(&net)), DateTime::from_timestamp(0, 0));

        contract
            .networks()
            .set_address(Some(&net), Some(Address::parse("0x1").unwrap()))
            .unwrap();
        assert!(contract.updated_at(Some(&net)) > DateTime::from_timestamp(0, 0));
    }

    #[test]
    fn errors_name_the_contract() {
        let err = metacoin().address(None).unwrap_err();
        assert!(err.to_string().starts_with("MetaCoin has no network id set"));
    }

    #[test]
    fn to_raw_includes_overlay_records() {
        let contract = metacoin();
        let net = NetworkId::from("5777");
        contract
            .networks()
            .set_address(Some(&net), Some(Address::parse("0x1").unwrap()))
            .unwrap();
        let raw = contract.to_raw().unwrap();
        assert_eq!(raw.networks[&net].address.as_ref().map(Address::as_str), Some("0x1"));
    }
}
