//! Refresh tokens are stored only as hex SHA-256 digests.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a raw token.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("abc"), hash);
        assert_ne!(hash_token("abd"), hash);
    }
}
