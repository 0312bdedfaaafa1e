//! # Threshold Secret Sharing
//!
//! Shamir sharing over GF(256) for M-of-N authorization of high-impact
//! operations (emergency pause, large-value approval, key recovery).
//!
//! ## Construction
//!
//! For every byte position independently, [`ThresholdScheme::split`] draws a
//! random polynomial of degree `T−1` whose constant term is that secret byte
//! and evaluates it at `x = 1..=N`. Evaluation `i` becomes byte `pos` of share
//! `i`. `x = 0` is never a share index, because `f(0)` is the secret.
//!
//! [`ThresholdScheme::reconstruct`] recovers each byte by Lagrange
//! interpolation at `x = 0` over the first `T` supplied shares. Interpolation
//! is exact over a field, so any `T` distinct shares from one split recover
//! the secret.
//!
//! ## Security Invariant
//!
//! Fewer than `T` shares reveal nothing about the secret. Random coefficients
//! and reconstructed secrets are held in zeroizing buffers.

use std::str::FromStr;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sss_core::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::gf256;

/// One share of a split secret.
///
/// `index` is the 1-based x-coordinate; `data` has the same length as the
/// secret. Text form is `"<index>:<hex>"`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ShamirShare {
    /// 1-based share number (the evaluation point).
    pub index: u8,
    /// One byte per secret byte.
    pub data: Vec<u8>,
}

impl ShamirShare {
    /// Render as `"<index>:<hex>"`.
    pub fn to_encoded(&self) -> String {
        format!("{}:{}", self.index, hex::encode(&self.data))
    }
}

impl FromStr for ShamirShare {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, data) = s.trim().split_once(':').ok_or_else(|| {
            CryptoError::InvalidConfiguration("share must look like <index>:<hex>".to_string())
        })?;
        let index = index
            .parse::<u8>()
            .map_err(|e| CryptoError::InvalidConfiguration(format!("invalid share index: {e}")))?;
        let data = hex::decode(data)
            .map_err(|e| CryptoError::InvalidConfiguration(format!("invalid share hex: {e}")))?;
        Ok(Self { index, data })
    }
}

impl Serialize for ShamirShare {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_encoded())
    }
}

impl<'de> Deserialize<'de> for ShamirShare {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for ShamirShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShamirShare(#{}, {} bytes)", self.index, self.data.len())
    }
}

/// A validated `(T, N)` threshold configuration.
///
/// Deserialization goes through [`ThresholdScheme::new`], so a stored scheme
/// obeys the same bounds as a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholdScheme")]
pub struct ThresholdScheme {
    threshold: u8,
    total: u8,
}

#[derive(Deserialize)]
struct RawThresholdScheme {
    threshold: u8,
    total: u8,
}

impl TryFrom<RawThresholdScheme> for ThresholdScheme {
    type Error = CryptoError;

    fn try_from(raw: RawThresholdScheme) -> Result<Self, Self::Error> {
        Self::new(raw.threshold, raw.total)
    }
}

impl ThresholdScheme {
    /// Validate `2 <= threshold <= total <= 255`.
    pub fn new(threshold: u8, total: u8) -> Result<Self, CryptoError> {
        if threshold < 2 {
            return Err(CryptoError::InvalidConfiguration(format!(
                "threshold must be at least 2, got {threshold}"
            )));
        }
        if threshold > total {
            return Err(CryptoError::InvalidConfiguration(format!(
                "threshold {threshold} exceeds total shares {total}"
            )));
        }
        Ok(Self { threshold, total })
    }

    /// Shares required to reconstruct.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Shares produced by a split.
    pub fn total(&self) -> u8 {
        self.total
    }

    /// Split `secret` into `total` shares using the OS CSPRNG.
    pub fn split(&self, secret: &[u8]) -> Result<Vec<ShamirShare>, CryptoError> {
        self.split_with_rng(secret, &mut rand::rngs::OsRng)
    }

    /// Split `secret` with a caller-supplied CSPRNG.
    pub fn split_with_rng<R: RngCore + CryptoRng>(
        &self,
        secret: &[u8],
        rng: &mut R,
    ) -> Result<Vec<ShamirShare>, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::InvalidConfiguration(
                "cannot split an empty secret".to_string(),
            ));
        }

        let mut shares: Vec<ShamirShare> = (1..=self.total)
            .map(|index| ShamirShare {
                index,
                data: vec![0u8; secret.len()],
            })
            .collect();

        let mut coeffs = Zeroizing::new(vec![0u8; self.threshold as usize]);
        for (pos, byte) in secret.iter().enumerate() {
            coeffs[0] = *byte;
            rng.fill_bytes(&mut coeffs[1..]);
            for share in shares.iter_mut() {
                share.data[pos] = gf256::eval_poly(&coeffs, share.index);
            }
        }
        Ok(shares)
    }

    /// Reconstruct the secret from at least `threshold` shares.
    ///
    /// Exactly the first `threshold` shares are used; extra shares are
    /// ignored, not cross-checked.
    pub fn reconstruct(&self, shares: &[ShamirShare]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let t = self.threshold as usize;
        if shares.len() < t {
            return Err(CryptoError::InsufficientShares {
                threshold: self.threshold,
                supplied: shares.len(),
            });
        }
        let used = &shares[..t];
        self.validate_shares(used)?;

        // Lagrange basis at x = 0: l_i = Π_{j≠i} x_j / (x_j − x_i).
        let basis: Vec<u8> = used
            .iter()
            .enumerate()
            .map(|(i, si)| {
                used.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .fold(1u8, |acc, (_, sj)| {
                        gf256::mul(acc, gf256::div(sj.index, gf256::add(sj.index, si.index)))
                    })
            })
            .collect();

        let len = used[0].data.len();
        let mut secret = Zeroizing::new(vec![0u8; len]);
        for (pos, out) in secret.iter_mut().enumerate() {
            *out = used
                .iter()
                .zip(basis.iter())
                .fold(0u8, |acc, (share, l)| gf256::add(acc, gf256::mul(share.data[pos], *l)));
        }
        Ok(secret)
    }

    fn validate_shares(&self, shares: &[ShamirShare]) -> Result<(), CryptoError> {
        let len = match shares.first() {
            Some(first) if !first.data.is_empty() => first.data.len(),
            Some(_) => return Err(CryptoError::InvalidConfiguration("empty share".to_string())),
            None => return Err(CryptoError::InvalidConfiguration("no shares".to_string())),
        };
        let mut seen = [false; 256];
        for share in shares {
            if share.index == 0 || share.index > self.total {
                return Err(CryptoError::InvalidConfiguration(format!(
                    "share index {} outside 1..={}",
                    share.index, self.total
                )));
            }
            if seen[share.index as usize] {
                return Err(CryptoError::InvalidConfiguration(format!(
                    "duplicate share index {}",
                    share.index
                )));
            }
            seen[share.index as usize] = true;
            if share.data.len() != len {
                return Err(CryptoError::InvalidConfiguration(format!(
                    "share lengths differ: {} vs {len}",
                    share.data.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_bounds() {
        assert!(ThresholdScheme::new(2, 2).is_ok());
        assert!(ThresholdScheme::new(255, 255).is_ok());
        assert!(matches!(
            ThresholdScheme::new(1, 3),
            Err(CryptoError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ThresholdScheme::new(4, 3),
            Err(CryptoError::InvalidConfiguration(_))
        ));
        assert!(ThresholdScheme::new(0, 0).is_err());
    }

    #[test]
    fn test_single_byte_all_pairs() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        let shares = scheme.split(&[42]).unwrap();
        assert_eq!(shares.len(), 3);
        for (a, b) in [(0, 1), (0, 2), (1, 2)] {
            let subset = vec![shares[a].clone(), shares[b].clone()];
            assert_eq!(scheme.reconstruct(&subset).unwrap().as_slice(), &[42]);
        }
    }

    #[test]
    fn test_share_indices_are_one_based() {
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let shares = scheme.split(b"authorization-key").unwrap();
        let indices: Vec<u8> = shares.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(shares.iter().all(|s| s.data.len() == 17));
    }

    #[test]
    fn test_insufficient_shares() {
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let shares = scheme.split(b"secret").unwrap();
        let err = scheme.reconstruct(&shares[..2]).unwrap_err();
        assert_eq!(
            err,
            CryptoError::InsufficientShares {
                threshold: 3,
                supplied: 2
            }
        );
    }

    #[test]
    fn test_uses_first_threshold_shares_only() {
        let scheme = ThresholdScheme::new(2, 4).unwrap();
        let mut shares = scheme.split(b"pause").unwrap();
        // A corrupted trailing share is never read.
        shares[3].data = vec![0xff; 5];
        assert_eq!(scheme.reconstruct(&shares).unwrap().as_slice(), b"pause");
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        let shares = scheme.split(b"k").unwrap();
        let dup = vec![shares[0].clone(), shares[0].clone()];
        assert!(matches!(
            scheme.reconstruct(&dup),
            Err(CryptoError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_index_and_length_mismatch_rejected() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        let zero = vec![
            ShamirShare { index: 0, data: vec![1] },
            ShamirShare { index: 1, data: vec![2] },
        ];
        assert!(scheme.reconstruct(&zero).is_err());
        let ragged = vec![
            ShamirShare { index: 1, data: vec![1] },
            ShamirShare { index: 2, data: vec![2, 3] },
        ];
        assert!(scheme.reconstruct(&ragged).is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        assert!(scheme.split(&[]).is_err());
    }

    #[test]
    fn test_independent_splits_differ_but_both_reconstruct() {
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let secret = [7u8; 32];
        let a = scheme.split(&secret).unwrap();
        let b = scheme.split(&secret).unwrap();
        assert_ne!(a, b);
        assert_eq!(scheme.reconstruct(&a[2..]).unwrap().as_slice(), &secret);
        assert_eq!(scheme.reconstruct(&b[..3]).unwrap().as_slice(), &secret);
    }

    #[test]
    fn test_encoded_roundtrip() {
        let share = ShamirShare { index: 7, data: vec![0xde, 0xad] };
        assert_eq!(share.to_encoded(), "7:dead");
        let parsed: ShamirShare = "7:dead".parse().unwrap();
        assert_eq!(parsed, share);
        assert!("dead".parse::<ShamirShare>().is_err());
        assert!("300:dead".parse::<ShamirShare>().is_err());
    }

    #[test]
    fn test_deserialize_enforces_bounds() {
        let scheme: ThresholdScheme =
            serde_json::from_str(r#"{"threshold":3,"total":5}"#).unwrap();
        assert_eq!(scheme, ThresholdScheme::new(3, 5).unwrap());
        assert!(serde_json::from_str::<ThresholdScheme>(r#"{"threshold":0,"total":0}"#).is_err());
        assert!(serde_json::from_str::<ThresholdScheme>(r#"{"threshold":1,"total":1}"#).is_err());
        assert!(serde_json::from_str::<ThresholdScheme>(r#"{"threshold":4,"total":3}"#).is_err());
    }

    #[test]
    fn test_reconstruct_without_shares_is_error() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        assert_eq!(
            scheme.reconstruct(&[]).unwrap_err(),
            CryptoError::InsufficientShares {
                threshold: 2,
                supplied: 0
            }
        );
    }

    #[test]
    fn test_debug_hides_share_bytes() {
        let share = ShamirShare { index: 1, data: vec![0xaa; 4] };
        assert_eq!(format!("{share:?}"), "ShamirShare(#1, 4 bytes)");
    }
}
