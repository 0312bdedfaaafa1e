//! # Jurisdiction Types
//!
//! The closed set of jurisdictions a whitelisted wallet can be classified
//! under. Screening rules (for example, restricting USA wallets) are not
//! encoded here; they are configured in [`crate::PolicyConfig`] and applied by
//! the compliance crate's jurisdiction policy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Jurisdiction of a verified wallet holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// Japan.
    Japan,
    /// Singapore.
    Singapore,
    /// Hong Kong.
    HongKong,
    /// European Union.
    Eu,
    /// United States.
    Usa,
    /// Any other jurisdiction.
    Other,
}

impl Jurisdiction {
    /// All variants, in declaration order.
    pub const ALL: [Jurisdiction; 6] = [
        Self::Japan,
        Self::Singapore,
        Self::HongKong,
        Self::Eu,
        Self::Usa,
        Self::Other,
    ];

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Japan => "japan",
            Self::Singapore => "singapore",
            Self::HongKong => "hong_kong",
            Self::Eu => "eu",
            Self::Usa => "usa",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Jurisdiction {
    type Err = String;

    /// Accepts the canonical names plus ISO-style short codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "japan" | "jp" => Ok(Self::Japan),
            "singapore" | "sg" => Ok(Self::Singapore),
            "hong_kong" | "hongkong" | "hk" => Ok(Self::HongKong),
            "eu" => Ok(Self::Eu),
            "usa" | "us" => Ok(Self::Usa),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown jurisdiction: {other:?}")),
        }
    }
}
