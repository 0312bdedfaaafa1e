//! # sss-issuance — Issuance Control
//!
//! Controls how a token's supply changes and who may change it.
//!
//! - [`preset`]: SSS-1 / SSS-2 / Custom flag bundles.
//! - [`config`]: the per-token mint configuration and role table.
//! - [`issuer`]: issuer records with independent daily mint and burn ceilings.
//! - [`vault`]: the collateral vault backing the supply.
//! - [`ledger`]: the token-account substrate, behind a trait.
//! - [`authorization`]: threshold-guarded authorization for emergency calls.
//! - [`control`]: [`IssuanceControl`], which composes all of the above into
//!   mint, burn, seize, freeze and pause.
//!
//! ## Security Invariant
//!
//! Under SSS-1 the permanent delegate is off, so no code path in this crate
//! can move tokens out of a holder's account without the holder.

pub mod authorization;
pub mod config;
pub mod control;
pub mod issuer;
pub mod ledger;
pub mod preset;
pub mod vault;

pub use authorization::ThresholdGuard;
pub use config::{MintConfig, MintInit, Role, RoleConfig, RoleUpdate, FULL_BACKING_BPS};
pub use control::{
    BurnReceipt, BurnRequest, CollateralReceipt, IssuanceControl, MintReceipt, MintRequest,
    SeizeReceipt, SeizeRequest,
};
pub use issuer::{Issuer, IssuerType, IssuerUpdate, ISSUER_NAMESPACE};
pub use ledger::{InMemoryLedger, TokenLedger};
pub use preset::{FeatureFlags, Preset};
pub use vault::{collateral_ratio_bps, CollateralType, CollateralVault, VaultInit, VaultStatus};
