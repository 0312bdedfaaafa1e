//! # Compliance Registry
//!
//! One registry per token. It owns a whitelist entry and a blacklist entry per
//! wallet, both located at addresses derived from the token's mint and the
//! wallet, and is mutated only by its authority.
//!
//! ## Security Invariant
//!
//! - Entries are deactivated, never deleted. A removed whitelist entry keeps
//!   its KYC hash and volume history.
//! - A wallet may hold an active whitelist entry and an active blacklist entry
//!   at the same time. The transfer gate resolves that in favour of the
//!   blacklist.
//! - Expiry is evaluated at use-time. Nothing sweeps expired entries.
//!
//! ## Locking
//!
//! Records live in `DashMap`s keyed by derived address; a record mutation
//! holds that record's shard lock for its whole read-check-write. Registry
//! state (authority, active flag, whitelist count) sits behind a separate
//! `RwLock`. No code path holds a record guard and the state lock together.

use std::str::FromStr;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sss_core::{
    Address, ComplianceError, DailyCounter, Hash32, Jurisdiction, PolicyConfig, Timestamp,
};

use crate::policy::{ConfiguredJurisdictionPolicy, JurisdictionPolicy, PermitAll};

/// Namespace tag for whitelist record addresses.
pub const WHITELIST_NAMESPACE: &[u8] = b"whitelist";
/// Namespace tag for blacklist record addresses.
pub const BLACKLIST_NAMESPACE: &[u8] = b"blacklist";

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Depth of identity verification behind a whitelist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycLevel {
    /// Basic checks.
    Basic,
    /// Standard retail KYC.
    Standard,
    /// Enhanced due diligence.
    Enhanced,
    /// Institutional onboarding.
    Institutional,
}

impl KycLevel {
    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Enhanced => "enhanced",
            Self::Institutional => "institutional",
        }
    }
}

impl std::fmt::Display for KycLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "enhanced" => Ok(Self::Enhanced),
            "institutional" => Ok(Self::Institutional),
            other => Err(format!("unknown KYC level: {other:?}")),
        }
    }
}

/// KYC outcome supplied when whitelisting a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Verification depth.
    pub kyc_level: KycLevel,
    /// Jurisdiction the holder was verified in.
    pub jurisdiction: Jurisdiction,
    /// Digest of the off-ledger KYC evidence.
    pub kyc_hash: Hash32,
    /// Daily transfer ceiling in base units; 0 means unlimited.
    pub daily_limit: u64,
    /// Instant after which the verification no longer counts.
    pub expiry: Timestamp,
}

/// A wallet's whitelist record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub wallet: Address,
    pub kyc_level: KycLevel,
    pub jurisdiction: Jurisdiction,
    pub kyc_hash: Hash32,
    /// Daily transfer ceiling; 0 means unlimited.
    pub daily_limit: u64,
    /// Volume sent in the current UTC day.
    pub counter: DailyCounter,
    pub verified_at: Timestamp,
    pub expiry: Timestamp,
    pub last_activity: Timestamp,
    pub is_active: bool,
}

impl WhitelistEntry {
    fn enroll(wallet: Address, enrollment: Enrollment, now: Timestamp) -> Self {
        Self {
            wallet,
            kyc_level: enrollment.kyc_level,
            jurisdiction: enrollment.jurisdiction,
            kyc_hash: enrollment.kyc_hash,
            daily_limit: enrollment.daily_limit,
            counter: DailyCounter::new(now),
            verified_at: now,
            expiry: enrollment.expiry,
            last_activity: now,
            is_active: true,
        }
    }

    /// Whether the verification has lapsed at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiry < now
    }

    /// Volume counted against the limit at `now`, after any epoch reset.
    pub fn daily_volume(&self, now: Timestamp) -> u64 {
        self.counter.volume_at(now)
    }
}

/// A wallet's blacklist record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub wallet: Address,
    pub reason: String,
    pub added_at: Timestamp,
    /// Set when the entry is deactivated; `None` while active.
    pub removed_at: Option<Timestamp>,
    pub is_active: bool,
}

/// Registry-level state, copied out for reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    pub authority: Address,
    pub is_active: bool,
    /// Number of wallets with an active whitelist entry.
    pub whitelist_count: u64,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Whitelist/blacklist registry for one token.
pub struct ComplianceRegistry {
    mint: Address,
    state: RwLock<RegistryState>,
    pub(crate) whitelist: DashMap<Address, WhitelistEntry>,
    pub(crate) blacklist: DashMap<Address, BlacklistEntry>,
    pub(crate) jurisdictions: Arc<dyn JurisdictionPolicy>,
    pub(crate) require_recipient_whitelisted: bool,
}

impl ComplianceRegistry {
    /// Create an active, empty registry for `mint`, administered by
    /// `authority`, permitting every jurisdiction.
    pub fn new(mint: Address, authority: Address) -> Self {
        Self {
            mint,
            state: RwLock::new(RegistryState {
                authority,
                is_active: true,
                whitelist_count: 0,
            }),
            whitelist: DashMap::new(),
            blacklist: DashMap::new(),
            jurisdictions: Arc::new(PermitAll),
            require_recipient_whitelisted: true,
        }
    }

    /// Create a registry whose screening follows `policy`.
    pub fn with_policy(mint: Address, authority: Address, policy: &PolicyConfig) -> Self {
        let mut registry = Self::new(mint, authority);
        registry.jurisdictions = Arc::new(ConfiguredJurisdictionPolicy::from(policy));
        registry.require_recipient_whitelisted = policy.require_recipient_whitelisted;
        registry
    }

    /// Replace the jurisdiction screening hook.
    pub fn with_jurisdiction_policy(mut self, policy: Arc<dyn JurisdictionPolicy>) -> Self {
        self.jurisdictions = policy;
        self
    }

    /// The token this registry screens.
    pub fn mint(&self) -> Address {
        self.mint
    }

    /// Snapshot of registry-level state.
    pub fn state(&self) -> RegistryState {
        *self.state.read()
    }

    pub fn authority(&self) -> Address {
        self.state.read().authority
    }

    pub fn is_active(&self) -> bool {
        self.state.read().is_active
    }

    pub fn whitelist_count(&self) -> u64 {
        self.state.read().whitelist_count
    }

    /// Address of `wallet`'s whitelist record.
    pub fn whitelist_address(&self, wallet: &Address) -> Address {
        Address::derive(WHITELIST_NAMESPACE, &[self.mint.as_ref(), wallet.as_ref()])
    }

    /// Address of `wallet`'s blacklist record.
    pub fn blacklist_address(&self, wallet: &Address) -> Address {
        Address::derive(BLACKLIST_NAMESPACE, &[self.mint.as_ref(), wallet.as_ref()])
    }

    /// Copy of `wallet`'s whitelist record, active or not.
    pub fn whitelist_entry(&self, wallet: &Address) -> Option<WhitelistEntry> {
        self.whitelist
            .get(&self.whitelist_address(wallet))
            .map(|e| e.value().clone())
    }

    /// Copy of `wallet`'s blacklist record, active or not.
    pub fn blacklist_entry(&self, wallet: &Address) -> Option<BlacklistEntry> {
        self.blacklist
            .get(&self.blacklist_address(wallet))
            .map(|e| e.value().clone())
    }

    /// Whether `wallet` has an active blacklist entry.
    pub fn is_blacklisted(&self, wallet: &Address) -> bool {
        self.blacklist
            .get(&self.blacklist_address(wallet))
            .is_some_and(|e| e.is_active)
    }

    fn require_authority(&self, caller: &Address, operation: &str) -> Result<(), ComplianceError> {
        let authority = self.authority();
        if *caller != authority {
            tracing::warn!(
                mint = %self.mint,
                caller = %caller,
                operation,
                "rejected: caller is not the registry authority"
            );
            return Err(ComplianceError::Unauthorized(format!(
                "{operation} requires the registry authority"
            )));
        }
        Ok(())
    }

    fn adjust_whitelist_count(&self, was_active: bool, is_active: bool) {
        if was_active == is_active {
            return;
        }
        let mut state = self.state.write();
        state.whitelist_count = if is_active {
            state.whitelist_count.saturating_add(1)
        } else {
            state.whitelist_count.saturating_sub(1)
        };
    }

    // ─── Registry lifecycle ─────────────────────────────────────────

    /// Activate or deactivate the registry. An inactive registry denies every
    /// transfer.
    pub fn set_active(&self, caller: &Address, active: bool) -> Result<(), ComplianceError> {
        self.require_authority(caller, "set_active")?;
        self.state.write().is_active = active;
        tracing::info!(mint = %self.mint, active, "registry active flag set");
        Ok(())
    }

    // ─── Whitelist ──────────────────────────────────────────────────

    /// Create or overwrite `wallet`'s whitelist entry.
    ///
    /// The entry becomes active with zero daily volume in the epoch of `now`.
    pub fn add_to_whitelist(
        &self,
        caller: &Address,
        wallet: Address,
        enrollment: Enrollment,
        now: Timestamp,
    ) -> Result<WhitelistEntry, ComplianceError> {
        self.require_authority(caller, "add_to_whitelist")?;
        if !self.jurisdictions.allows_enrollment(enrollment.jurisdiction) {
            tracing::warn!(
                mint = %self.mint,
                wallet = %wallet,
                jurisdiction = %enrollment.jurisdiction,
                "rejected: jurisdiction not allowed at enrollment"
            );
            return Err(ComplianceError::JurisdictionNotAllowed {
                jurisdiction: enrollment.jurisdiction,
                operation: "enrollment",
            });
        }

        let entry = WhitelistEntry::enroll(wallet, enrollment, now);
        let was_active = match self.whitelist.entry(self.whitelist_address(&wallet)) {
            Entry::Occupied(mut existing) => {
                let was_active = existing.get().is_active;
                existing.insert(entry.clone());
                was_active
            }
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                false
            }
        };
        self.adjust_whitelist_count(was_active, true);

        tracing::info!(
            mint = %self.mint,
            wallet = %wallet,
            kyc_level = %entry.kyc_level,
            jurisdiction = %entry.jurisdiction,
            daily_limit = entry.daily_limit,
            "wallet whitelisted"
        );
        Ok(entry)
    }

    /// Deactivate `wallet`'s whitelist entry, keeping its history.
    pub fn remove_from_whitelist(
        &self,
        caller: &Address,
        wallet: &Address,
    ) -> Result<WhitelistEntry, ComplianceError> {
        self.require_authority(caller, "remove_from_whitelist")?;
        let key = self.whitelist_address(wallet);
        let (was_active, entry) = {
            let mut record = self
                .whitelist
                .get_mut(&key)
                .ok_or_else(|| ComplianceError::NotFound {
                    record: "whitelist entry",
                    key: key.to_hex(),
                })?;
            let was_active = record.is_active;
            record.is_active = false;
            (was_active, record.value().clone())
        };
        self.adjust_whitelist_count(was_active, false);
        tracing::info!(mint = %self.mint, wallet = %wallet, "wallet removed from whitelist");
        Ok(entry)
    }

    // ─── Blacklist ──────────────────────────────────────────────────

    /// Create or overwrite `wallet`'s blacklist entry. Independent of the
    /// wallet's whitelist state.
    pub fn add_to_blacklist(
        &self,
        caller: &Address,
        wallet: Address,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<BlacklistEntry, ComplianceError> {
        self.require_authority(caller, "add_to_blacklist")?;
        let entry = BlacklistEntry {
            wallet,
            reason: reason.into(),
            added_at: now,
            removed_at: None,
            is_active: true,
        };
        self.blacklist
            .insert(self.blacklist_address(&wallet), entry.clone());
        tracing::info!(mint = %self.mint, wallet = %wallet, reason = %entry.reason, "wallet blacklisted");
        Ok(entry)
    }

    /// Deactivate `wallet`'s blacklist entry, stamping `removed_at`.
    pub fn remove_from_blacklist(
        &self,
        caller: &Address,
        wallet: &Address,
        now: Timestamp,
    ) -> Result<BlacklistEntry, ComplianceError> {
        self.require_authority(caller, "remove_from_blacklist")?;
        let key = self.blacklist_address(wallet);
        let mut record = self
            .blacklist
            .get_mut(&key)
            .ok_or_else(|| ComplianceError::NotFound {
                record: "blacklist entry",
                key: key.to_hex(),
            })?;
        record.is_active = false;
        record.removed_at = Some(now);
        let entry = record.value().clone();
        drop(record);
        tracing::info!(mint = %self.mint, wallet = %wallet, "wallet removed from blacklist");
        Ok(entry)
    }
}

impl std::fmt::Debug for ComplianceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceRegistry")
            .field("mint", &self.mint)
            .field("state", &self.state())
            .field("jurisdictions", &self.jurisdictions)
            .finish_non_exhaustive()
    }
}
