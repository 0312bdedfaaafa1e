//! # Address — Identity Newtype
//!
//! Wallets, mints, issuers, authorities and treasuries are all identified by a
//! 32-byte public-key-shaped [`Address`]. Records owned by the control plane
//! (whitelist entries, blacklist entries, issuers) live at addresses derived
//! from a namespace tag and seeds, the way the ledger substrate locates
//! program-owned accounts.
//!
//! ## Security Invariant
//!
//! Derivation is domain-separated: every seed is length-prefixed before
//! hashing, so `("whitelist", [ab, c])` and `("whitelist", [a, bc])` can never
//! collide on the same record address.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// A 32-byte identity (wallet, mint, issuer authority, treasury, ...).
///
/// Serializes as a lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 32;

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "address hex must be 64 chars, got {}",
                s.len()
            )));
        }
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| CryptoError::KeyError(format!("invalid address hex: {e}")))?;
        Ok(Self(arr))
    }

    /// Derive a record address from a namespace tag and seeds.
    ///
    /// Deterministic: the same `(namespace, seeds)` always yields the same
    /// address.
    pub fn derive(namespace: &[u8], seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"sss-record-v1");
        hasher.update((namespace.len() as u32).to_le_bytes());
        hasher.update(namespace);
        for seed in seeds {
            hasher.update((seed.len() as u32).to_le_bytes());
            hasher.update(seed);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
