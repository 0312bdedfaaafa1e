//! # Threshold-Guarded Authorization
//!
//! High-impact operations (emergency pause, large-value approval, key
//! recovery) can be authorized by any quorum of custodians instead of a
//! single role holder. The guard stores only the SHA-256 commitment of the
//! authorization secret and the `(T, N)` scheme; custodians hold the shares.
//!
//! ## Security Invariant
//!
//! The reconstructed secret is compared to the commitment in constant time
//! and is zeroized when `authorize` returns.

use serde::{Deserialize, Serialize};
use sss_core::{CryptoError, Hash32};
use sss_crypto::{hash, ShamirShare, ThresholdScheme};
use subtle::ConstantTimeEq;

/// Commitment to an authorization secret plus its sharing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdGuard {
    scheme: ThresholdScheme,
    commitment: Hash32,
}

impl ThresholdGuard {
    pub fn new(scheme: ThresholdScheme, commitment: Hash32) -> Self {
        Self { scheme, commitment }
    }

    /// Split a fresh `secret` into shares and build the guard that accepts
    /// them. The caller distributes the shares and discards the secret.
    pub fn provision(
        scheme: ThresholdScheme,
        secret: &[u8],
    ) -> Result<(Self, Vec<ShamirShare>), CryptoError> {
        let shares = scheme.split(secret)?;
        Ok((Self::new(scheme, hash(secret)), shares))
    }

    pub fn scheme(&self) -> ThresholdScheme {
        self.scheme
    }

    pub fn commitment(&self) -> Hash32 {
        self.commitment
    }

    /// Reconstruct from `shares` and check against the commitment.
    pub fn authorize(&self, shares: &[ShamirShare]) -> Result<(), CryptoError> {
        let secret = self.scheme.reconstruct(shares)?;
        let digest = hash(&secret);
        if bool::from(digest.as_bytes().as_slice().ct_eq(self.commitment.as_bytes().as_slice())) {
            Ok(())
        } else {
            Err(CryptoError::AuthorizationFailed)
        }
    }
}
