use sha3::{Digest, Keccak256};

/// Keccak-256 digest (the pre-standard SHA-3 variant used for event topics).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 digest as a `0x`-prefixed lowercase hex string.
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_vector() {
        assert_eq!(
            keccak256_hex(b""),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn transfer_topic() {
        assert_eq!(
            keccak256_hex(b"Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn digest_is_32_bytes() {
        assert_eq!(keccak256(b"abc").len(), 32);
        assert_eq!(keccak256_hex(b"abc").len(), 66);
    }
}
