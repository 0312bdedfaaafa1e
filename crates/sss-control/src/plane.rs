//! # Token Control Plane
//!
//! One handle per token. It owns the token's compliance registry, issuance
//! control, ledger, policy and clock, reads the time once per operation, and
//! journals every committed transition.
//!
//! ## Transfers
//!
//! When the token's transfer-hook flag is set, every transfer is routed
//! through the compliance gate and settled on the ledger under the sender's
//! record lock. Without the hook the ledger's own rules apply (balance and
//! freeze state only). With `pause_halts_transfers` a paused token refuses
//! transfers as well as issuance.
//!
//! ## Minting under the hook
//!
//! A hooked token also screens mint recipients with the receive-side check,
//! so new units never land in a blacklisted wallet.

use std::sync::Arc;

use parking_lot::Mutex;
use sss_compliance::{
    BlacklistEntry, ComplianceRegistry, Eligibility, Enrollment, TransferReceipt, WhitelistEntry,
};
use sss_core::{
    Address, Clock, Hash32, IssuanceError, PolicyConfig, SssError, Timestamp,
};
use sss_crypto::ShamirShare;
use sss_issuance::{
    BurnReceipt, BurnRequest, CollateralReceipt, InMemoryLedger, IssuanceControl, Issuer,
    IssuerType, IssuerUpdate, MintInit, MintReceipt, MintRequest, RoleConfig, RoleUpdate,
    SeizeReceipt, SeizeRequest, ThresholdGuard, TokenLedger, VaultInit, VaultStatus,
};

use crate::journal::{ControlEvent, Journal, JournalEntry};

/// The control-plane handle for one token.
pub struct TokenControlPlane {
    mint: Address,
    policy: PolicyConfig,
    registry: ComplianceRegistry,
    issuance: IssuanceControl,
    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
    journal: Mutex<Journal>,
}

impl TokenControlPlane {
    /// Initialize a token backed by an [`InMemoryLedger`]. Accounts start
    /// frozen when the resolved flags ask for it.
    pub fn new(
        mint: Address,
        init: MintInit,
        vault: VaultInit,
        policy: PolicyConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SssError> {
        let frozen = init.preset.resolve_flags(init.flags).default_account_frozen;
        let ledger: Arc<dyn TokenLedger> = Arc::new(InMemoryLedger::with_default_frozen(frozen));
        Self::with_ledger(mint, init, vault, policy, clock, ledger)
    }

    /// Initialize a token on an externally supplied ledger.
    pub fn with_ledger(
        mint: Address,
        init: MintInit,
        vault: VaultInit,
        policy: PolicyConfig,
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn TokenLedger>,
    ) -> Result<Self, SssError> {
        policy.validate()?;
        let now = clock.now();
        let authority = init.authority;
        let issuance = IssuanceControl::initialize(mint, init, vault, Arc::clone(&ledger), now)?
            .with_reference_dedup(policy.deduplicate_references);
        let registry = ComplianceRegistry::with_policy(mint, authority, &policy);
        tracing::info!(
            mint = %mint,
            pause_halts_transfers = policy.pause_halts_transfers,
            deduplicate_references = policy.deduplicate_references,
            "control plane ready"
        );
        Ok(Self {
            mint,
            policy,
            registry,
            issuance,
            ledger,
            clock,
            journal: Mutex::new(Journal::new()),
        })
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn mint(&self) -> Address {
        self.mint
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn registry(&self) -> &ComplianceRegistry {
        &self.registry
    }

    pub fn issuance(&self) -> &IssuanceControl {
        &self.issuance
    }

    pub fn ledger(&self) -> &Arc<dyn TokenLedger> {
        &self.ledger
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.ledger.balance_of(account)
    }

    /// Snapshot of the journal.
    pub fn events(&self) -> Vec<JournalEntry> {
        self.journal.lock().entries().to_vec()
    }

    pub fn events_for(&self, wallet: &Address) -> Vec<JournalEntry> {
        self.journal
            .lock()
            .entries_for(wallet)
            .into_iter()
            .cloned()
            .collect()
    }

    fn record(&self, at: Timestamp, actor: Option<Address>, event: ControlEvent) {
        self.journal.lock().append(at, actor, event);
    }

    fn transfer_hook(&self) -> bool {
        self.issuance.config().flags.transfer_hook
    }

    // ─── Compliance ─────────────────────────────────────────────────

    pub fn whitelist(
        &self,
        caller: &Address,
        wallet: Address,
        enrollment: Enrollment,
    ) -> Result<WhitelistEntry, SssError> {
        let now = self.now();
        let entry = self.registry.add_to_whitelist(caller, wallet, enrollment, now)?;
        self.record(
            now,
            Some(*caller),
            ControlEvent::Whitelisted {
                wallet,
                kyc_hash: entry.kyc_hash,
                daily_limit: entry.daily_limit,
                expiry: entry.expiry,
            },
        );
        Ok(entry)
    }

    pub fn remove_from_whitelist(&self, caller: &Address, wallet: &Address) -> Result<WhitelistEntry, SssError> {
        let entry = self.registry.remove_from_whitelist(caller, wallet)?;
        self.record(self.now(), Some(*caller), ControlEvent::WhitelistRemoved { wallet: *wallet });
        Ok(entry)
    }

    pub fn blacklist(
        &self,
        caller: &Address,
        wallet: Address,
        reason: impl Into<String>,
    ) -> Result<BlacklistEntry, SssError> {
        let now = self.now();
        let entry = self.registry.add_to_blacklist(caller, wallet, reason, now)?;
        self.record(
            now,
            Some(*caller),
            ControlEvent::Blacklisted {
                wallet,
                reason: entry.reason.clone(),
            },
        );
        Ok(entry)
    }

    pub fn remove_from_blacklist(&self, caller: &Address, wallet: &Address) -> Result<BlacklistEntry, SssError> {
        let now = self.now();
        let entry = self.registry.remove_from_blacklist(caller, wallet, now)?;
        self.record(now, Some(*caller), ControlEvent::BlacklistRemoved { wallet: *wallet });
        Ok(entry)
    }

    pub fn set_registry_active(&self, caller: &Address, active: bool) -> Result<(), SssError> {
        self.registry.set_active(caller, active)?;
        self.record(self.now(), Some(*caller), ControlEvent::RegistryActiveSet { active });
        Ok(())
    }

    /// Pure eligibility check at the current time.
    pub fn check_transfer_eligible(&self, wallet: &Address, amount: u64) -> Eligibility {
        self.registry.check_transfer_eligible(wallet, amount, self.now())
    }

    // ─── Transfers ──────────────────────────────────────────────────

    /// Move `amount` from `sender` to `recipient`.
    pub fn transfer(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: u64,
    ) -> Result<TransferReceipt, SssError> {
        if amount == 0 {
            return Err(IssuanceError::InvalidAmount.into());
        }
        if self.policy.pause_halts_transfers && self.issuance.is_paused() {
            tracing::debug!(mint = %self.mint, sender = %sender, "transfer refused while paused");
            return Err(IssuanceError::Paused.into());
        }
        let now = self.now();
        let receipt = if self.transfer_hook() {
            self.registry
                .execute_transfer_with(sender, recipient, amount, now, || {
                    self.ledger
                        .transfer(sender, recipient, amount)
                        .map_err(SssError::from)
                })?
        } else {
            self.ledger.transfer(sender, recipient, amount)?;
            TransferReceipt {
                sender: *sender,
                recipient: *recipient,
                amount,
                sender_daily_volume: 0,
            }
        };
        self.record(
            now,
            Some(*sender),
            ControlEvent::Transferred {
                sender: *sender,
                recipient: *recipient,
                amount,
            },
        );
        Ok(receipt)
    }

    // ─── Roles and issuers ──────────────────────────────────────────

    pub fn update_roles(&self, caller: &Address, update: RoleUpdate) -> Result<RoleConfig, SssError> {
        let roles = self.issuance.update_roles(caller, update)?;
        self.record(self.now(), Some(*caller), ControlEvent::RolesUpdated);
        Ok(roles)
    }

    pub fn register_issuer(
        &self,
        caller: &Address,
        authority: Address,
        issuer_type: IssuerType,
        daily_mint_limit: u64,
        daily_burn_limit: u64,
    ) -> Result<Issuer, SssError> {
        let now = self.now();
        let issuer = self.issuance.register_issuer(
            caller,
            authority,
            issuer_type,
            daily_mint_limit,
            daily_burn_limit,
            now,
        )?;
        self.record(
            now,
            Some(*caller),
            ControlEvent::IssuerRegistered {
                issuer: authority,
                daily_mint_limit,
                daily_burn_limit,
            },
        );
        Ok(issuer)
    }

    pub fn update_issuer(
        &self,
        caller: &Address,
        authority: &Address,
        update: IssuerUpdate,
    ) -> Result<Issuer, SssError> {
        let issuer = self.issuance.update_issuer(caller, authority, update)?;
        self.record(
            self.now(),
            Some(*caller),
            ControlEvent::IssuerUpdated {
                issuer: *authority,
                daily_mint_limit: issuer.daily_mint_limit,
                daily_burn_limit: issuer.daily_burn_limit,
                is_active: issuer.is_active,
            },
        );
        Ok(issuer)
    }

    // ─── Issuance ───────────────────────────────────────────────────

    pub fn mint_tokens(&self, request: MintRequest) -> Result<MintReceipt, SssError> {
        let now = self.now();
        if self.transfer_hook() {
            self.registry
                .check_receive_eligible(&request.recipient, now)
                .into_result(&request.recipient)?;
        }
        let receipt = self.issuance.mint_tokens(request, now)?;
        self.record(
            now,
            Some(request.issuer),
            ControlEvent::Minted {
                issuer: request.issuer,
                recipient: request.recipient,
                amount: request.amount,
                reference: request.reference,
                total_supply: receipt.total_supply,
            },
        );
        Ok(receipt)
    }

    pub fn burn_tokens(&self, request: BurnRequest) -> Result<BurnReceipt, SssError> {
        let now = self.now();
        let receipt = self.issuance.burn_tokens(request, now)?;
        self.record(
            now,
            Some(request.issuer),
            ControlEvent::Burned {
                issuer: request.issuer,
                holder: request.holder,
                amount: request.amount,
                reference: request.reference,
                total_supply: receipt.total_supply,
            },
        );
        Ok(receipt)
    }

    pub fn seize(&self, caller: &Address, request: SeizeRequest) -> Result<SeizeReceipt, SssError> {
        let receipt = self.issuance.seize(caller, request)?;
        self.record(
            self.now(),
            Some(*caller),
            ControlEvent::Seized {
                source: receipt.source,
                treasury: receipt.treasury,
                amount: receipt.amount,
                reason: receipt.reason,
            },
        );
        Ok(receipt)
    }

    pub fn freeze_account(&self, caller: &Address, account: &Address) -> Result<(), SssError> {
        self.issuance.set_account_frozen(caller, account, true)?;
        self.record(self.now(), Some(*caller), ControlEvent::AccountFrozen { account: *account });
        Ok(())
    }

    pub fn thaw_account(&self, caller: &Address, account: &Address) -> Result<(), SssError> {
        self.issuance.set_account_frozen(caller, account, false)?;
        self.record(self.now(), Some(*caller), ControlEvent::AccountThawed { account: *account });
        Ok(())
    }

    pub fn pause(&self, caller: &Address) -> Result<(), SssError> {
        let now = self.now();
        self.issuance.pause(caller, now)?;
        self.record(now, Some(*caller), ControlEvent::Paused { emergency: false });
        Ok(())
    }

    pub fn unpause(&self, caller: &Address) -> Result<(), SssError> {
        let now = self.now();
        self.issuance.unpause(caller, now)?;
        self.record(now, Some(*caller), ControlEvent::Unpaused);
        Ok(())
    }

    /// Pause on a custodian quorum's authority.
    pub fn emergency_pause(&self, guard: &ThresholdGuard, shares: &[ShamirShare]) -> Result<(), SssError> {
        let now = self.now();
        self.issuance.emergency_pause(guard, shares, now)?;
        self.record(now, None, ControlEvent::Paused { emergency: true });
        Ok(())
    }

    // ─── Collateral ─────────────────────────────────────────────────

    pub fn deposit_collateral(
        &self,
        caller: &Address,
        amount: u64,
        proof_hash: Hash32,
    ) -> Result<CollateralReceipt, SssError> {
        let receipt = self.issuance.deposit_collateral(caller, amount, proof_hash)?;
        self.record(
            self.now(),
            Some(*caller),
            ControlEvent::CollateralUpdated {
                total_collateral: receipt.total_collateral,
                proof_hash,
            },
        );
        Ok(receipt)
    }

    pub fn withdraw_collateral(
        &self,
        caller: &Address,
        amount: u64,
        proof_hash: Hash32,
    ) -> Result<CollateralReceipt, SssError> {
        let receipt = self.issuance.withdraw_collateral(caller, amount, proof_hash)?;
        self.record(
            self.now(),
            Some(*caller),
            ControlEvent::CollateralUpdated {
                total_collateral: receipt.total_collateral,
                proof_hash,
            },
        );
        Ok(receipt)
    }

    pub fn submit_audit(
        &self,
        caller: &Address,
        verified_amount: u64,
        audit_hash: Hash32,
    ) -> Result<CollateralReceipt, SssError> {
        let now = self.now();
        let receipt = self
            .issuance
            .submit_audit(caller, verified_amount, audit_hash, now)?;
        self.record(
            now,
            Some(*caller),
            ControlEvent::AuditSubmitted {
                verified_amount,
                audit_hash,
            },
        );
        Ok(receipt)
    }

    pub fn set_vault_status(&self, caller: &Address, status: VaultStatus) -> Result<(), SssError> {
        self.issuance.set_vault_status(caller, status)?;
        self.record(self.now(), Some(*caller), ControlEvent::VaultStatusSet { status });
        Ok(())
    }
}

impl std::fmt::Debug for TokenControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenControlPlane")
            .field("mint", &self.mint)
            .field("policy", &self.policy)
            .field("issuance", &self.issuance)
            .field("events", &self.journal.lock().len())
            .finish_non_exhaustive()
    }
}
