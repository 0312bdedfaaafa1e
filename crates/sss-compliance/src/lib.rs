//! # sss-compliance — Compliance Registry and Transfer Gate
//!
//! Decides who may hold, receive and move a token.
//!
//! - [`registry`]: per-token whitelist and blacklist records, mutated only by
//!   the registry authority.
//! - [`gate`]: the transfer decision. Blacklist takes precedence over
//!   whitelist, then expiry, then the per-wallet daily limit.
//! - [`policy`]: the jurisdiction screening hook consulted at enrollment and
//!   at transfer time.
//!
//! All decision functions take the current time as an argument; the caller
//! reads it from a [`sss_core::Clock`].

pub mod gate;
pub mod policy;
pub mod registry;

pub use gate::{DenialReason, Eligibility, TransferReceipt};
pub use policy::{ConfiguredJurisdictionPolicy, JurisdictionPolicy, PermitAll};
pub use registry::{
    BlacklistEntry, ComplianceRegistry, Enrollment, KycLevel, RegistryState, WhitelistEntry,
};
