//! Bytecode linking.
//!
//! Library addresses are unknown at compile time, so the compiler leaves a
//! placeholder wherever one is needed. Linking overwrites each declared
//! placeholder range with the library's address.
//!
//! Offsets and lengths count hex characters of the bytecode body; a leading
//! `0x` is not counted and is kept in the output.

use std::collections::{BTreeMap, BTreeSet};

use adb_store::LinkReference;
use adb_types::Address;

/// Width of a Truffle-style `__Name____` placeholder (one 20-byte address).
pub const PLACEHOLDER_LENGTH: usize = 40;

fn split_prefix(bytes: &str) -> (&str, &str) {
    match bytes.strip_prefix("0x") {
        Some(body) => ("0x", body),
        None => ("", bytes),
    }
}

/// Character `index` of the address sized to exactly `length` characters.
///
/// Short addresses are left-padded with `0`; long ones keep their rightmost
/// `length` digits. Nothing is materialized, so `length` may be arbitrary.
fn fitted_digit(digits: &[char], length: usize, index: usize) -> char {
    if digits.len() >= length {
        digits[digits.len() - length + index]
    } else {
        let padding = length - digits.len();
        if index < padding {
            '0'
        } else {
            digits[index - padding]
        }
    }
}

/// Write addresses from `links` into every declared placeholder range.
///
/// References whose name is missing from `links` (or that have no name) are
/// left untouched, as are ranges past the end of the body. This never fails.
pub fn link_bytecode(
    bytes: &str,
    link_references: &[LinkReference],
    links: &BTreeMap<String, Address>,
) -> String {
    let (prefix, body) = split_prefix(bytes);
    let mut chars: Vec<char> = body.chars().collect();

    for reference in link_references {
        let Some(address) = reference.name.as_ref().and_then(|name| links.get(name)) else {
            continue;
        };
        let digits: Vec<char> = address.hex_digits().chars().collect();
        for &offset in &reference.offsets {
            if offset >= chars.len() {
                continue;
            }
            let end = offset.saturating_add(reference.length).min(chars.len());
            for (index, slot) in chars[offset..end].iter_mut().enumerate() {
                *slot = fitted_digit(&digits, reference.length, index);
            }
        }
    }

    let mut linked = String::with_capacity(prefix.len() + chars.len());
    linked.push_str(prefix);
    linked.extend(chars);
    linked
}

/// Find Truffle-style `__Name____` placeholders in unlinked bytecode.
///
/// Hex bytecode never contains `_`, so every `__` starts a placeholder of
/// [`PLACEHOLDER_LENGTH`] characters whose name is the text between the
/// underscore padding. All offsets of one name are grouped into one
/// reference; references come back sorted by name.
pub fn detect_link_references(bytes: &str) -> Vec<LinkReference> {
    let (_, body) = split_prefix(bytes);
    let chars: Vec<char> = body.chars().collect();
    let mut found: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

    let mut i = 0;
    while i + PLACEHOLDER_LENGTH <= chars.len() {
        if chars[i] == '_' && chars[i + 1] == '_' {
            let placeholder: String = chars[i..i + PLACEHOLDER_LENGTH].iter().collect();
            let name = placeholder.trim_matches('_');
            if !name.is_empty() {
                found.entry(name.to_string()).or_default().insert(i);
                i += PLACEHOLDER_LENGTH;
                continue;
            }
        }
        i += 1;
    }

    found
        .into_iter()
        .map(|(name, offsets)| LinkReference {
            offsets,
            length: PLACEHOLDER_LENGTH,
            name: Some(name),
        })
        .collect()
}
