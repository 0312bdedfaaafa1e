//! # Confidential Channel
//!
//! Authenticated public-key encryption for KYC/PII payloads exchanged between
//! compliance counterparties: X25519 key agreement with XSalsa20-Poly1305
//! (the NaCl `box` construction) and a fresh random 24-byte nonce per
//! message.
//!
//! ## Security Invariant
//!
//! - Decryption fails closed. A tampered ciphertext, a wrong sender key or a
//!   wrong recipient key all yield [`CryptoError::DecryptionFailed`] with no
//!   partial plaintext.
//! - Two encryptions of the same plaintext differ, because each draws its own
//!   nonce.
//! - `ChannelKeypair` does not implement `Serialize` and its `Debug` output
//!   shows only the public key.
//!
//! Only the [`EncryptedPayload::content_hash`] is anchored on-ledger; the
//! payload itself travels off-ledger.

use crypto_box::aead::{self, Aead, AeadCore, OsRng};
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sss_core::{CryptoError, Hash32};

use crate::sha256::hash;

/// Length of the per-message nonce in bytes.
pub const NONCE_LEN: usize = 24;

/// An X25519 public key (32 bytes). Serializes as hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelPublicKey(pub [u8; 32]);

/// An X25519 keypair used to send and receive encrypted payloads.
pub struct ChannelKeypair {
    secret: SecretKey,
}

/// Ciphertext plus everything the recipient needs to authenticate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Poly1305-authenticated ciphertext.
    #[serde(with = "hex_vec")]
    pub ciphertext: Vec<u8>,
    /// Random per-message nonce.
    #[serde(with = "hex_nonce")]
    pub nonce: [u8; NONCE_LEN],
    /// Public key of the sender, authenticated by the MAC.
    pub sender_public_key: ChannelPublicKey,
}

// ---------------------------------------------------------------------------
// ChannelPublicKey
// ---------------------------------------------------------------------------

impl ChannelPublicKey {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key hex: {e}")))?;
        Ok(Self(arr))
    }

    fn to_box_key(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl Serialize for ChannelPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChannelPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for ChannelPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChannelPublicKey({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for ChannelPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// ChannelKeypair
// ---------------------------------------------------------------------------

impl ChannelKeypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from its 32-byte secret. The public key is derived
    /// deterministically from the secret.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self {
            secret: SecretKey::from(bytes),
        }
    }

    /// Parse a keypair from a 64-character hex secret.
    pub fn from_secret_hex(s: &str) -> Result<Self, CryptoError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut arr)
            .map_err(|e| CryptoError::KeyError(format!("invalid secret key hex: {e}")))?;
        Ok(Self::from_secret_bytes(arr))
    }

    /// Export the secret key bytes. Callers are responsible for storage.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// This keypair's public key.
    pub fn public_key(&self) -> ChannelPublicKey {
        ChannelPublicKey(*self.secret.public_key().as_bytes())
    }

    /// Encrypt `plaintext` for `recipient`, authenticated as coming from
    /// this keypair.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &ChannelPublicKey,
    ) -> Result<EncryptedPayload, CryptoError> {
        let salsa_box = SalsaBox::new(&recipient.to_box_key(), &self.secret);
        let nonce = SalsaBox::generate_nonce(&mut OsRng);
        let ciphertext = salsa_box
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::KeyError("encryption failed".to_string()))?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce.as_slice());
        Ok(EncryptedPayload {
            ciphertext,
            nonce: nonce_bytes,
            sender_public_key: self.public_key(),
        })
    }

    /// Decrypt a payload addressed to this keypair.
    ///
    /// Authenticates against `payload.sender_public_key`; any mismatch or
    /// modification fails with `DecryptionFailed`.
    pub fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
        self.decrypt_from(payload, &payload.sender_public_key)
    }

    /// Decrypt, requiring the payload to come from `expected_sender`.
    pub fn decrypt_from(
        &self,
        payload: &EncryptedPayload,
        expected_sender: &ChannelPublicKey,
    ) -> Result<Vec<u8>, CryptoError> {
        let salsa_box = SalsaBox::new(&expected_sender.to_box_key(), &self.secret);
        let nonce = aead::Nonce::<SalsaBox>::from_slice(&payload.nonce);
        salsa_box
            .decrypt(nonce, payload.ciphertext.as_slice())
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

impl std::fmt::Debug for ChannelKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelKeypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// EncryptedPayload
// ---------------------------------------------------------------------------

impl EncryptedPayload {
    /// Wire form: `sender_public_key || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(self.sender_public_key.as_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the wire form produced by [`EncryptedPayload::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < 32 + NONCE_LEN {
            return Err(CryptoError::InvalidConfiguration(format!(
                "payload too short: {} bytes",
                bytes.len()
            )));
        }
        let mut sender = [0u8; 32];
        sender.copy_from_slice(&bytes[..32]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[32..32 + NONCE_LEN]);
        Ok(Self {
            ciphertext: bytes[32 + NONCE_LEN..].to_vec(),
            nonce,
            sender_public_key: ChannelPublicKey(sender),
        })
    }

    /// The 32-byte digest anchored on-ledger for this payload.
    pub fn content_hash(&self) -> Hash32 {
        hash(&self.to_bytes())
    }
}

mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

mod hex_nonce {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NONCE_LEN;

    pub fn serialize<S: Serializer>(bytes: &[u8; NONCE_LEN], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; NONCE_LEN], D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut out = [0u8; NONCE_LEN];
        hex::decode_to_slice(s, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}
