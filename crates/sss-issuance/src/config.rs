//! # Mint Configuration and Roles
//!
//! The per-token singleton that issuance control reads on every call, and the
//! role assignments that authorize privileged calls.

use serde::{Deserialize, Serialize};
use sss_core::{Address, IssuanceError, Timestamp};

use crate::preset::{FeatureFlags, Preset};

/// Required collateral ratio: 100% backing.
pub const FULL_BACKING_BPS: u64 = 10_000;

/// Caller-supplied parameters for initializing a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintInit {
    pub authority: Address,
    pub preset: Preset,
    pub decimals: u8,
    pub collateral_ratio_bps: u64,
    /// Ignored under SSS-1; defaults to the preset's flags when absent.
    pub flags: Option<FeatureFlags>,
    pub treasury: Option<Address>,
}

impl MintInit {
    /// SSS-1 parameters with full backing.
    pub fn sss1(authority: Address, decimals: u8) -> Self {
        Self {
            authority,
            preset: Preset::Sss1,
            decimals,
            collateral_ratio_bps: FULL_BACKING_BPS,
            flags: None,
            treasury: None,
        }
    }

    /// SSS-2 parameters with full backing and every flag enabled.
    pub fn sss2(authority: Address, decimals: u8, treasury: Address) -> Self {
        Self {
            authority,
            preset: Preset::Sss2,
            decimals,
            collateral_ratio_bps: FULL_BACKING_BPS,
            flags: None,
            treasury: Some(treasury),
        }
    }
}

/// Per-token issuance configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfig {
    pub authority: Address,
    pub preset: Preset,
    pub decimals: u8,
    pub collateral_ratio_bps: u64,
    pub flags: FeatureFlags,
    pub treasury: Option<Address>,
    pub paused: bool,
    pub total_supply: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MintConfig {
    /// Validate `init` against its preset and build the configuration.
    pub fn initialize(init: MintInit, now: Timestamp) -> Result<Self, IssuanceError> {
        if init.collateral_ratio_bps != FULL_BACKING_BPS {
            return Err(IssuanceError::InvalidConfiguration(format!(
                "collateral ratio must be {FULL_BACKING_BPS} bps, got {}",
                init.collateral_ratio_bps
            )));
        }
        if init.preset.requires_treasury() && init.treasury.is_none() {
            return Err(IssuanceError::InvalidConfiguration(format!(
                "preset {} requires a treasury account",
                init.preset
            )));
        }
        Ok(Self {
            authority: init.authority,
            preset: init.preset,
            decimals: init.decimals,
            collateral_ratio_bps: init.collateral_ratio_bps,
            flags: init.preset.resolve_flags(init.flags),
            treasury: init.treasury,
            paused: false,
            total_supply: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether seizure is structurally possible.
    pub fn can_seize(&self) -> bool {
        self.flags.permanent_delegate
    }
}

/// A privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    IssuerAdmin,
    ComplianceOfficer,
    Pauser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssuerAdmin => "issuer_admin",
            Self::ComplianceOfficer => "compliance_officer",
            Self::Pauser => "pauser",
        }
    }
}

/// Role assignments. The master authority holds every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub master_authority: Address,
    pub issuer_admin: Option<Address>,
    pub compliance_officer: Option<Address>,
    pub pauser: Option<Address>,
}

/// Partial role update: `None` leaves a role unchanged, `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub issuer_admin: Option<Option<Address>>,
    pub compliance_officer: Option<Option<Address>>,
    pub pauser: Option<Option<Address>>,
}

impl RoleConfig {
    /// Only the master authority; no delegated roles.
    pub fn new(master_authority: Address) -> Self {
        Self {
            master_authority,
            issuer_admin: None,
            compliance_officer: None,
            pauser: None,
        }
    }

    /// Whether `caller` may act as `role`.
    pub fn holds(&self, role: Role, caller: &Address) -> bool {
        if *caller == self.master_authority {
            return true;
        }
        let assigned = match role {
            Role::IssuerAdmin => self.issuer_admin,
            Role::ComplianceOfficer => self.compliance_officer,
            Role::Pauser => self.pauser,
        };
        assigned.as_ref() == Some(caller)
    }

    pub fn apply(&mut self, update: RoleUpdate) {
        if let Some(issuer_admin) = update.issuer_admin {
            self.issuer_admin = issuer_admin;
        }
        if let Some(compliance_officer) = update.compliance_officer {
            self.compliance_officer = compliance_officer;
        }
        if let Some(pauser) = update.pauser {
            self.pauser = pauser;
        }
    }
}
