use adb_types::{ContentId, ResourceKind};
use serde::Serialize;

/// Computes record identities.
///
/// Each record kind hashes under its own BLAKE3 derive-key context, so a
/// source and a bytecode whose normalized forms happen to be byte-equal
/// still get different ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentityHasher {
    kind: ResourceKind,
}

impl IdentityHasher {
    pub const fn for_kind(kind: ResourceKind) -> Self {
        Self { kind }
    }

    fn context(&self) -> &'static str {
        match self.kind {
            ResourceKind::Source => "adb-source-v1",
            ResourceKind::Bytecode => "adb-bytecode-v1",
            ResourceKind::Compilation => "adb-compilation-v1",
        }
    }

    fn digest(&self, data: &[u8]) -> ContentId {
        let mut hasher = blake3::Hasher::new_derive_key(self.context());
        hasher.update(data);
        ContentId::from_hash(*hasher.finalize().as_bytes())
    }

    /// The id of a normalized identity value.
    ///
    /// Struct fields serialize in declaration order and `serde_json` maps are
    /// key-sorted, so equal content always yields equal bytes.
    pub fn identify<T: Serialize>(&self, value: &T) -> Result<ContentId, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.digest(&data))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const KINDS: [ResourceKind; 3] = [
        ResourceKind::Source,
        ResourceKind::Bytecode,
        ResourceKind::Compilation,
    ];

    #[test]
    fn kinds_never_share_an_id() {
        let value = json!({"contents": "contract Migrations {}"});
        let ids: Vec<ContentId> = KINDS
            .iter()
            .map(|&kind| IdentityHasher::for_kind(kind).identify(&value).unwrap())
            .collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[0], ids[2]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn map_key_order_does_not_matter() {
        let a = json!({"optimizer": {"enabled": true, "runs": 200}, "evmVersion": "byzantium"});
        let b = json!({"evmVersion": "byzantium", "optimizer": {"runs": 200, "enabled": true}});
        let hasher = IdentityHasher::for_kind(ResourceKind::Compilation);
        assert_eq!(hasher.identify(&a).unwrap(), hasher.identify(&b).unwrap());
    }

    #[test]
    fn empty_value_is_not_the_null_id() {
        let id = IdentityHasher::for_kind(ResourceKind::Source).identify(&"").unwrap();
        assert!(!id.is_null());
    }

    proptest! {
        #[test]
        fn equal_content_equal_id(contents in ".{0,64}") {
            let hasher = IdentityHasher::for_kind(ResourceKind::Source);
            let copy = contents.clone();
            prop_assert_eq!(hasher.identify(&contents).unwrap(), hasher.identify(&copy).unwrap());
        }

        #[test]
        fn distinct_content_distinct_id(a in "[a-z]{1,32}", b in "[a-z]{1,32}") {
            prop_assume!(a != b);
            let hasher = IdentityHasher::for_kind(ResourceKind::Source);
            prop_assert_ne!(hasher.identify(&a).unwrap(), hasher.identify(&b).unwrap());
        }
    }
}
