//! # Digests and Fixed-Length Byte Fields
//!
//! `Hash32` carries every 32-byte opaque value the control plane anchors:
//! KYC evidence hashes, mint references, collateral proof hashes, audit
//! hashes and seizure reason codes. `RedemptionInfo` carries the 64-byte
//! redemption payload attached to a burn.
//!
//! Both parse from fixed-length hex, and both are zero-filled when an
//! optional input is absent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::{CanonicalizationError, CryptoError};

/// A 32-byte hash or opaque fixed-length code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

/// A 64-byte redemption payload (typically ciphertext of bank details).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RedemptionInfo(pub [u8; 64]);

/// SHA-256 of canonical bytes.
///
/// Accepts only `&CanonicalBytes`; use [`sha256_raw`] for opaque payloads
/// such as ciphertexts.
pub fn sha256_digest(data: &CanonicalBytes) -> Hash32 {
    sha256_raw(data.as_bytes())
}

/// The 32-byte KYC hash of a structured evidence record: SHA-256 over its
/// JCS-canonical JSON.
pub fn evidence_digest(record: &impl Serialize) -> Result<Hash32, CanonicalizationError> {
    Ok(sha256_digest(&CanonicalBytes::new(record)?))
}

/// SHA-256 of arbitrary bytes.
pub fn sha256_raw(data: &[u8]) -> Hash32 {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&Sha256::digest(data));
    Hash32(bytes)
}

fn decode_fixed<const N: usize>(s: &str, what: &str) -> Result<[u8; N], CryptoError> {
    let s = s.trim();
    if s.len() != N * 2 {
        return Err(CryptoError::InvalidConfiguration(format!(
            "{what} hex must be {} chars, got {}",
            N * 2,
            s.len()
        )));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out)
        .map_err(|e| CryptoError::InvalidConfiguration(format!("invalid {what} hex: {e}")))?;
    Ok(out)
}

impl Hash32 {
    /// The all-zero value used when an optional hash is absent.
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse exactly 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        decode_fixed::<32>(s, "hash").map(Self)
    }

    /// Parse if present, zero-fill if absent.
    pub fn from_hex_or_zero(s: Option<&str>) -> Result<Self, CryptoError> {
        s.map_or(Ok(Self::ZERO), Self::from_hex)
    }

    /// Pack a short ASCII code (e.g. a seizure reason) into 32 bytes,
    /// truncating anything longer and zero-padding the rest.
    pub fn from_code(code: &str) -> Self {
        let mut out = [0u8; 32];
        let bytes = code.as_bytes();
        let n = bytes.len().min(32);
        out[..n].copy_from_slice(&bytes[..n]);
        Self(out)
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl RedemptionInfo {
    /// The all-zero value used when redemption info is absent.
    pub const ZERO: RedemptionInfo = RedemptionInfo([0u8; 64]);

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse exactly 128 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        decode_fixed::<64>(s, "redemption info").map(Self)
    }

    /// Parse if present, zero-fill if absent.
    pub fn from_hex_or_zero(s: Option<&str>) -> Result<Self, CryptoError> {
        s.map_or(Ok(Self::ZERO), Self::from_hex)
    }
}

impl Default for RedemptionInfo {
    fn default() -> Self {
        Self::ZERO
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}...)", stringify!($ty), hex::encode(&self.0[..4]))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
}

hex_serde!(Hash32);
hex_serde!(RedemptionInfo);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_empty_input_vector() {
        assert_eq!(
            sha256_raw(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_absent_values_zero_fill() {
        assert_eq!(Hash32::from_hex_or_zero(None).unwrap(), Hash32::ZERO);
        assert_eq!(RedemptionInfo::from_hex_or_zero(None).unwrap(), RedemptionInfo::ZERO);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(matches!(
            Hash32::from_hex("00"),
            Err(CryptoError::InvalidConfiguration(_))
        ));
        assert!(RedemptionInfo::from_hex(&"00".repeat(32)).is_err());
        assert!(RedemptionInfo::from_hex(&"00".repeat(64)).is_ok());
    }

    #[test]
    fn test_from_code_truncates_and_pads() {
        let code = Hash32::from_code("SANCTIONS");
        assert_eq!(&code.0[..9], b"SANCTIONS");
        assert!(code.0[9..].iter().all(|b| *b == 0));
        let long = Hash32::from_code(&"x".repeat(40));
        assert!(long.0.iter().all(|b| *b == b'x'));
    }
}
