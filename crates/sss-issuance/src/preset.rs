//! # Compliance Presets
//!
//! A preset is a named bundle of token-extension flags. SSS-1 is minimal and
//! seizure-proof by construction; SSS-2 is compliant and seizure-capable by
//! configuration; Custom takes the caller's flags as given.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named compliance preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// SSS-1: minimal. No delegate, no hook, accounts open by default.
    #[default]
    Sss1,
    /// SSS-2: compliant. Permanent delegate, transfer hook, frozen-by-default
    /// accounts, and a treasury for seized funds.
    Sss2,
    /// Caller-specified flags.
    Custom,
}

/// Token-extension flags carried by a mint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Permits seizure from frozen accounts.
    pub permanent_delegate: bool,
    /// Routes every transfer through the compliance gate.
    pub transfer_hook: bool,
    /// New token accounts start frozen until thawed by compliance.
    pub default_account_frozen: bool,
}

impl FeatureFlags {
    /// All flags off.
    pub const NONE: FeatureFlags = FeatureFlags {
        permanent_delegate: false,
        transfer_hook: false,
        default_account_frozen: false,
    };

    /// All flags on.
    pub const ALL: FeatureFlags = FeatureFlags {
        permanent_delegate: true,
        transfer_hook: true,
        default_account_frozen: true,
    };
}

impl Preset {
    /// Flags a preset starts from before any caller overrides.
    pub fn default_flags(self) -> FeatureFlags {
        match self {
            Self::Sss1 => FeatureFlags::NONE,
            Self::Sss2 => FeatureFlags::ALL,
            Self::Custom => FeatureFlags::NONE,
        }
    }

    /// Resolve the effective flags. SSS-1 ignores overrides.
    pub fn resolve_flags(self, requested: Option<FeatureFlags>) -> FeatureFlags {
        match self {
            Self::Sss1 => FeatureFlags::NONE,
            Self::Sss2 | Self::Custom => requested.unwrap_or_else(|| self.default_flags()),
        }
    }

    /// Whether a treasury account must be supplied at initialization.
    pub fn requires_treasury(self) -> bool {
        matches!(self, Self::Sss2)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sss1 => "sss-1",
            Self::Sss2 => "sss-2",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sss-1" | "sss1" | "sss_1" | "minimal" => Ok(Self::Sss1),
            "sss-2" | "sss2" | "sss_2" | "compliant" => Ok(Self::Sss2),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown preset: {other:?}")),
        }
    }
}
