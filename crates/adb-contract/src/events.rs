//! Event lookup keys.
//!
//! Logs identify events by topic, so recorded events are keyed by the
//! Keccak-256 of the canonical signature. Entries that arrive with a
//! precomputed `signature` are keyed by that string instead.

use std::collections::BTreeMap;

use adb_crypto::keccak256_hex;
use adb_types::AbiEntry;

/// The key an ABI event is stored under.
pub fn event_key(entry: &AbiEntry) -> String {
    match &entry.signature {
        Some(signature) => signature.clone(),
        None => keccak256_hex(entry.canonical_signature().as_bytes()),
    }
}

/// Merge the ABI's events on top of a network's recorded events.
///
/// Entries are applied in ABI order, so a later entry overwrites an earlier
/// one (or a base entry) that shares its key.
pub fn merge_events(
    abi: &[AbiEntry],
    base: BTreeMap<String, AbiEntry>,
) -> BTreeMap<String, AbiEntry> {
    abi.iter()
        .filter(|entry| entry.is_event())
        .fold(base, |mut events, entry| {
            events.insert(event_key(entry), entry.clone());
            events
        })
}
