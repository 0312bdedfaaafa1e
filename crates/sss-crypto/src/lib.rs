//! # sss-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks consumed out-of-band by
//! compliance operators:
//!
//! - **Confidential Channel** ([`channel`]): X25519 + XSalsa20-Poly1305
//!   authenticated public-key encryption of KYC/PII payloads exchanged
//!   between compliance counterparties.
//! - **Content hashing** ([`sha256`]): the 32-byte digest anchored on-ledger
//!   in place of an off-ledger payload.
//! - **GF(256)** ([`gf256`]): branch-free field arithmetic over
//!   x⁸+x⁴+x³+x+1.
//! - **Threshold sharing** ([`shamir`]): M-of-N splitting and Lagrange
//!   reconstruction of authorization secrets.
//!
//! ## Crate Policy
//!
//! - Depends only on `sss-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   keys, real nonces and real field arithmetic.
//! - Secret material is never serialized into `Debug` output.

pub mod channel;
pub mod gf256;
pub mod sha256;
pub mod shamir;

pub use channel::{ChannelKeypair, ChannelPublicKey, EncryptedPayload, NONCE_LEN};
pub use sha256::hash;
pub use shamir::{ShamirShare, ThresholdScheme};
