//! # sss-core — Foundational Types for the Stablecoin Control Plane
//!
//! This crate is the leaf of the workspace. It defines the primitives every
//! other crate builds on: the error hierarchy, wallet/authority addresses,
//! jurisdictions, UTC timestamps, the shared daily-epoch counter, canonical
//! evidence digests, and the policy configuration.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identities.** Wallets, mints, issuers and
//!    authorities are all an [`Address`]; record locations are derived from a
//!    namespace tag plus seeds, never built by hand.
//!
//! 2. **Time is injected.** Decision functions receive a [`Timestamp`] from a
//!    [`Clock`]. Nothing below the CLI reads the wall clock directly, so tests
//!    pin time with [`FixedClock`].
//!
//! 3. **One epoch rule.** Whitelist entries and issuers share
//!    [`DailyCounter`], so the "reset on a new UTC day, then check, then
//!    increment" sequence is written once.
//!
//! 4. **Evidence hashes go through `CanonicalBytes`.** A structured KYC record
//!    hashes to the same 32 bytes regardless of field order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sss-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod config;
pub mod digest;
pub mod epoch;
pub mod error;
pub mod identity;
pub mod jurisdiction;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use config::PolicyConfig;
pub use digest::{evidence_digest, sha256_digest, sha256_raw, Hash32, RedemptionInfo};
pub use epoch::{DailyCounter, LimitExceeded};
pub use error::{
    CanonicalizationError, ComplianceError, ConfigError, CryptoError, IssuanceError, SssError,
};
pub use identity::Address;
pub use jurisdiction::Jurisdiction;
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp, SECONDS_PER_DAY};
