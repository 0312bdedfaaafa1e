//! # Content Hashing
//!
//! Pure, deterministic SHA-256 used to anchor evidence of an off-ledger
//! payload without revealing it. For structured evidence records prefer
//! [`sss_core::sha256_digest`] over `CanonicalBytes`; this function hashes
//! opaque bytes such as an [`crate::EncryptedPayload`].

use sss_core::{sha256_raw, Hash32};

/// SHA-256 of `bytes`.
pub fn hash(bytes: &[u8]) -> Hash32 {
    sha256_raw(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abc_vector() {
        assert_eq!(
            hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_deterministic_and_sensitive() {
        assert_eq!(hash(b"kyc-record"), hash(b"kyc-record"));
        assert_ne!(hash(b"kyc-record"), hash(b"kyc-recorD"));
    }
}
