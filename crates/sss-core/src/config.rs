//! # Policy Configuration
//!
//! Adopter-level policy decisions that the control plane deliberately does
//! not hardcode: jurisdiction screening at enrollment and at transfer time,
//! whether a pause also halts circulation, and replay protection for
//! mint/burn references.
//!
//! Loaded from YAML. Every field has a default, so an empty document is a
//! valid (fully permissive, issuance-only pause) policy.
//!
//! ```yaml
//! restricted_transfer_jurisdictions: [usa]
//! pause_halts_transfers: false
//! deduplicate_references: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::jurisdiction::Jurisdiction;

/// Policy switches for one token's control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Jurisdictions refused at whitelist enrollment.
    pub restricted_enrollment_jurisdictions: Vec<Jurisdiction>,
    /// Jurisdictions refused when a transfer is committed.
    pub restricted_transfer_jurisdictions: Vec<Jurisdiction>,
    /// When true, a paused token also rejects transfers.
    pub pause_halts_transfers: bool,
    /// When true, a mint/burn reference can be used only once.
    pub deduplicate_references: bool,
    /// When true, committed transfers also screen the recipient.
    pub require_recipient_whitelisted: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            restricted_enrollment_jurisdictions: Vec::new(),
            restricted_transfer_jurisdictions: Vec::new(),
            pause_halts_transfers: false,
            deduplicate_references: false,
            require_recipient_whitelisted: true,
        }
    }
}

impl PolicyConfig {
    /// Parse a policy from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a policy from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject policies that would make the token unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let restricts_all = |list: &[Jurisdiction]| {
            Jurisdiction::ALL.iter().all(|j| list.contains(j))
        };
        if restricts_all(&self.restricted_enrollment_jurisdictions) {
            return Err(ConfigError::Invalid(
                "every jurisdiction is restricted at enrollment".to_string(),
            ));
        }
        if restricts_all(&self.restricted_transfer_jurisdictions) {
            return Err(ConfigError::Invalid(
                "every jurisdiction is restricted at transfer".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `jurisdiction` may be enrolled.
    pub fn allows_enrollment(&self, jurisdiction: Jurisdiction) -> bool {
        !self.restricted_enrollment_jurisdictions.contains(&jurisdiction)
    }

    /// Whether `jurisdiction` may take part in a committed transfer.
    pub fn allows_transfer(&self, jurisdiction: Jurisdiction) -> bool {
        !self.restricted_transfer_jurisdictions.contains(&jurisdiction)
    }
}
