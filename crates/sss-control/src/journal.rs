//! # Control-Plane Journal
//!
//! Append-only record of every committed operation on a token, for
//! regulatory review and for replaying state into an external store.
//!
//! ## Security Invariant
//!
//! Every entry is individually digestable through `CanonicalBytes`, so an
//! exported journal can be anchored and later checked entry by entry.

use serde::{Deserialize, Serialize};
use sss_core::{evidence_digest, Address, CanonicalizationError, Hash32, Timestamp};
use sss_issuance::VaultStatus;

// ---------------------------------------------------------------------------
// ControlEvent
// ---------------------------------------------------------------------------

/// A committed state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    Whitelisted {
        wallet: Address,
        kyc_hash: Hash32,
        daily_limit: u64,
        expiry: Timestamp,
    },
    WhitelistRemoved {
        wallet: Address,
    },
    Blacklisted {
        wallet: Address,
        reason: String,
    },
    BlacklistRemoved {
        wallet: Address,
    },
    RegistryActiveSet {
        active: bool,
    },
    IssuerRegistered {
        issuer: Address,
        daily_mint_limit: u64,
        daily_burn_limit: u64,
    },
    IssuerUpdated {
        issuer: Address,
        daily_mint_limit: u64,
        daily_burn_limit: u64,
        is_active: bool,
    },
    RolesUpdated,
    Minted {
        issuer: Address,
        recipient: Address,
        amount: u64,
        reference: Hash32,
        total_supply: u64,
    },
    Burned {
        issuer: Address,
        holder: Address,
        amount: u64,
        reference: Hash32,
        total_supply: u64,
    },
    Seized {
        source: Address,
        treasury: Address,
        amount: u64,
        reason: Hash32,
    },
    AccountFrozen {
        account: Address,
    },
    AccountThawed {
        account: Address,
    },
    Paused {
        emergency: bool,
    },
    Unpaused,
    CollateralUpdated {
        total_collateral: u64,
        proof_hash: Hash32,
    },
    AuditSubmitted {
        verified_amount: u64,
        audit_hash: Hash32,
    },
    VaultStatusSet {
        status: VaultStatus,
    },
    Transferred {
        sender: Address,
        recipient: Address,
        amount: u64,
    },
}

impl ControlEvent {
    /// The snake_case event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Whitelisted { .. } => "whitelisted",
            Self::WhitelistRemoved { .. } => "whitelist_removed",
            Self::Blacklisted { .. } => "blacklisted",
            Self::BlacklistRemoved { .. } => "blacklist_removed",
            Self::RegistryActiveSet { .. } => "registry_active_set",
            Self::IssuerRegistered { .. } => "issuer_registered",
            Self::IssuerUpdated { .. } => "issuer_updated",
            Self::RolesUpdated => "roles_updated",
            Self::Minted { .. } => "minted",
            Self::Burned { .. } => "burned",
            Self::Seized { .. } => "seized",
            Self::AccountFrozen { .. } => "account_frozen",
            Self::AccountThawed { .. } => "account_thawed",
            Self::Paused { .. } => "paused",
            Self::Unpaused => "unpaused",
            Self::CollateralUpdated { .. } => "collateral_updated",
            Self::AuditSubmitted { .. } => "audit_submitted",
            Self::VaultStatusSet { .. } => "vault_status_set",
            Self::Transferred { .. } => "transferred",
        }
    }

    /// Whether `wallet` appears in the event as a party.
    pub fn involves(&self, wallet: &Address) -> bool {
        match self {
            Self::Whitelisted { wallet: w, .. }
            | Self::WhitelistRemoved { wallet: w }
            | Self::Blacklisted { wallet: w, .. }
            | Self::BlacklistRemoved { wallet: w }
            | Self::AccountFrozen { account: w }
            | Self::AccountThawed { account: w } => w == wallet,
            Self::IssuerRegistered { issuer, .. } | Self::IssuerUpdated { issuer, .. } => {
                issuer == wallet
            }
            Self::Minted {
                issuer, recipient, ..
            } => issuer == wallet || recipient == wallet,
            Self::Burned { issuer, holder, .. } => issuer == wallet || holder == wallet,
            Self::Seized {
                source, treasury, ..
            } => source == wallet || treasury == wallet,
            Self::Transferred {
                sender, recipient, ..
            } => sender == wallet || recipient == wallet,
            Self::RegistryActiveSet { .. }
            | Self::RolesUpdated
            | Self::Paused { .. }
            | Self::Unpaused
            | Self::CollateralUpdated { .. }
            | Self::AuditSubmitted { .. }
            | Self::VaultStatusSet { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// JournalEntry
// ---------------------------------------------------------------------------

/// One journal line: sequence number, time, event, and who performed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0.
    pub sequence: u64,
    pub at: Timestamp,
    /// `None` for events triggered by a custodian quorum or by a holder.
    pub actor: Option<Address>,
    #[serde(flatten)]
    pub event: ControlEvent,
}

impl JournalEntry {
    /// SHA-256 over the entry's canonical JSON.
    pub fn digest(&self) -> Result<Hash32, CanonicalizationError> {
        evidence_digest(self)
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Append-only event journal. Not `Sync` on its own; the control plane keeps
/// it behind a mutex.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, at: Timestamp, actor: Option<Address>, event: ControlEvent) -> u64 {
        let sequence = self.entries.len() as u64;
        tracing::trace!(sequence, kind = event.kind(), "journal append");
        self.entries.push(JournalEntry {
            sequence,
            at,
            actor,
            event,
        });
        sequence
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in which `wallet` is a party.
    pub fn entries_for(&self, wallet: &Address) -> Vec<&JournalEntry> {
        self.entries
            .iter()
            .filter(|e| e.event.involves(wallet))
            .collect()
    }

    /// Entries of one kind, by snake_case name.
    pub fn entries_of_kind(&self, kind: &str) -> Vec<&JournalEntry> {
        self.entries
            .iter()
            .filter(|e| e.event.kind() == kind)
            .collect()
    }
}
