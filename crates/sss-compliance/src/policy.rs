//! # Jurisdiction Screening
//!
//! Which jurisdictions may enroll, and which may move tokens, is an adopter
//! decision. The registry consults a [`JurisdictionPolicy`] at both points;
//! the default policy permits everything.

use std::fmt;

use sss_core::{Jurisdiction, PolicyConfig};

/// Screening hook consulted at whitelist enrollment and at transfer time.
pub trait JurisdictionPolicy: Send + Sync + fmt::Debug {
    /// Whether a wallet in `jurisdiction` may be whitelisted.
    fn allows_enrollment(&self, jurisdiction: Jurisdiction) -> bool;

    /// Whether a wallet in `jurisdiction` may send or receive a transfer.
    fn allows_transfer(&self, jurisdiction: Jurisdiction) -> bool;
}

/// Permits every jurisdiction at every stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl JurisdictionPolicy for PermitAll {
    fn allows_enrollment(&self, _jurisdiction: Jurisdiction) -> bool {
        true
    }

    fn allows_transfer(&self, _jurisdiction: Jurisdiction) -> bool {
        true
    }
}

/// Deny-lists taken from a [`PolicyConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfiguredJurisdictionPolicy {
    restricted_enrollment: Vec<Jurisdiction>,
    restricted_transfer: Vec<Jurisdiction>,
}

impl ConfiguredJurisdictionPolicy {
    /// Build from explicit deny-lists.
    pub fn new(restricted_enrollment: Vec<Jurisdiction>, restricted_transfer: Vec<Jurisdiction>) -> Self {
        Self {
            restricted_enrollment,
            restricted_transfer,
        }
    }
}

impl From<&PolicyConfig> for ConfiguredJurisdictionPolicy {
    fn from(config: &PolicyConfig) -> Self {
        Self::new(
            config.restricted_enrollment_jurisdictions.clone(),
            config.restricted_transfer_jurisdictions.clone(),
        )
    }
}

impl JurisdictionPolicy for ConfiguredJurisdictionPolicy {
    fn allows_enrollment(&self, jurisdiction: Jurisdiction) -> bool {
        !self.restricted_enrollment.contains(&jurisdiction)
    }

    fn allows_transfer(&self, jurisdiction: Jurisdiction) -> bool {
        !self.restricted_transfer.contains(&jurisdiction)
    }
}
