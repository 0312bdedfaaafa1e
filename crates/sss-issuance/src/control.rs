//! # Issuance Control
//!
//! The per-token handle that runs every mint, burn, seize and pause
//! decision. One handle per token; nothing is global, so several tokens can
//! live side by side in one process.
//!
//! ## Security Invariant
//!
//! - A mint never leaves `total_supply > vault collateral`.
//! - Seizure is impossible while the permanent-delegate flag is off, whatever
//!   the preset label says.
//! - A rejected call changes no record. Every check runs before the first
//!   write, and the ledger call that can still fail runs before issuer,
//!   supply and vault are updated.
//!
//! ## Locking
//!
//! Lock order is issuer record, then mint configuration, then vault, then the
//! reference set. The role table is read and released before any of them.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use sss_core::{Address, Hash32, IssuanceError, RedemptionInfo, SssError, Timestamp};
use sss_crypto::ShamirShare;

use crate::authorization::ThresholdGuard;
use crate::config::{MintConfig, MintInit, Role, RoleConfig, RoleUpdate};
use crate::issuer::{Issuer, IssuerType, IssuerUpdate, ISSUER_NAMESPACE};
use crate::ledger::TokenLedger;
use crate::vault::{collateral_ratio_bps, CollateralVault, VaultInit, VaultStatus};

// ---------------------------------------------------------------------------
// Requests and receipts
// ---------------------------------------------------------------------------

/// Issue `amount` to `recipient` under `issuer`'s ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub issuer: Address,
    pub recipient: Address,
    pub amount: u64,
    /// Bank-transfer reference; zero when absent.
    pub reference: Hash32,
}

/// Redeem `amount` held by `holder` under `issuer`'s ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRequest {
    pub issuer: Address,
    pub holder: Address,
    pub amount: u64,
    pub redemption_info: RedemptionInfo,
    /// Redemption reference; zero when absent.
    pub reference: Hash32,
}

/// Move a frozen account's balance to the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeizeRequest {
    pub source: Address,
    pub treasury: Address,
    /// 0 seizes the entire balance.
    pub amount: u64,
    /// Reason code.
    pub reason: Hash32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub issuer: Address,
    pub recipient: Address,
    pub amount: u64,
    pub reference: Hash32,
    pub total_supply: u64,
    pub issuer_daily_volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReceipt {
    pub issuer: Address,
    pub holder: Address,
    pub amount: u64,
    pub redemption_info: RedemptionInfo,
    pub total_supply: u64,
    pub collateral_released: u64,
    pub issuer_daily_volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeizeReceipt {
    pub source: Address,
    pub treasury: Address,
    pub amount: u64,
    pub reason: Hash32,
    pub seized_by: Address,
}

/// Vault and supply figures after a collateral movement or audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralReceipt {
    pub total_collateral: u64,
    pub total_supply: u64,
    pub collateral_ratio_bps: u64,
}

// ---------------------------------------------------------------------------
// Issuance control
// ---------------------------------------------------------------------------

/// Issuance decisions for one token.
pub struct IssuanceControl {
    mint: Address,
    config: RwLock<MintConfig>,
    roles: RwLock<RoleConfig>,
    issuers: DashMap<Address, Issuer>,
    vault: Mutex<CollateralVault>,
    seen_references: Option<Mutex<HashSet<Hash32>>>,
    ledger: Arc<dyn TokenLedger>,
}

impl IssuanceControl {
    /// Validate `init` against its preset and create the token's mint
    /// configuration, role table and collateral vault.
    pub fn initialize(
        mint: Address,
        init: MintInit,
        vault: VaultInit,
        ledger: Arc<dyn TokenLedger>,
        now: Timestamp,
    ) -> Result<Self, IssuanceError> {
        let config = MintConfig::initialize(init, now)?;
        tracing::info!(
            mint = %mint,
            preset = %config.preset,
            permanent_delegate = config.flags.permanent_delegate,
            transfer_hook = config.flags.transfer_hook,
            default_account_frozen = config.flags.default_account_frozen,
            "issuance initialized"
        );
        Ok(Self {
            mint,
            roles: RwLock::new(RoleConfig::new(config.authority)),
            config: RwLock::new(config),
            issuers: DashMap::new(),
            vault: Mutex::new(CollateralVault::new(vault, now)),
            seen_references: None,
            ledger,
        })
    }

    /// Reject reused mint/burn references from now on.
    pub fn with_reference_dedup(mut self, enabled: bool) -> Self {
        self.seen_references = enabled.then(|| Mutex::new(HashSet::new()));
        self
    }

    // ─── Reads ──────────────────────────────────────────────────────

    pub fn mint_address(&self) -> Address {
        self.mint
    }

    pub fn config(&self) -> MintConfig {
        *self.config.read()
    }

    pub fn roles(&self) -> RoleConfig {
        *self.roles.read()
    }

    pub fn vault(&self) -> CollateralVault {
        *self.vault.lock()
    }

    pub fn total_supply(&self) -> u64 {
        self.config.read().total_supply
    }

    pub fn is_paused(&self) -> bool {
        self.config.read().paused
    }

    pub fn ledger(&self) -> &Arc<dyn TokenLedger> {
        &self.ledger
    }

    /// Live collateral ratio in basis points.
    pub fn collateral_ratio_bps(&self) -> u64 {
        let supply = self.total_supply();
        collateral_ratio_bps(self.vault.lock().total_collateral, supply)
    }

    /// Address of `authority`'s issuer record.
    pub fn issuer_address(&self, authority: &Address) -> Address {
        Address::derive(ISSUER_NAMESPACE, &[self.mint.as_ref(), authority.as_ref()])
    }

    pub fn issuer(&self, authority: &Address) -> Option<Issuer> {
        self.issuers
            .get(&self.issuer_address(authority))
            .map(|i| i.value().clone())
    }

    fn require_role(&self, role: Role, caller: &Address, operation: &str) -> Result<(), IssuanceError> {
        if self.roles.read().holds(role, caller) {
            return Ok(());
        }
        tracing::warn!(
            mint = %self.mint,
            caller = %caller,
            role = role.as_str(),
            operation,
            "rejected: caller lacks role"
        );
        Err(IssuanceError::Unauthorized(format!(
            "{operation} requires the {} role",
            role.as_str()
        )))
    }

    fn require_master(&self, caller: &Address, operation: &str) -> Result<(), IssuanceError> {
        if self.roles.read().master_authority == *caller {
            return Ok(());
        }
        tracing::warn!(mint = %self.mint, caller = %caller, operation, "rejected: caller is not the master authority");
        Err(IssuanceError::Unauthorized(format!(
            "{operation} requires the master authority"
        )))
    }

    fn issuer_not_found(&self, authority: &Address) -> IssuanceError {
        IssuanceError::NotFound {
            record: "issuer",
            key: authority.to_hex(),
        }
    }

    // ─── Roles and issuers ──────────────────────────────────────────

    /// Reassign delegated roles. Master authority only.
    pub fn update_roles(&self, caller: &Address, update: RoleUpdate) -> Result<RoleConfig, IssuanceError> {
        self.require_master(caller, "update_roles")?;
        let mut roles = self.roles.write();
        roles.apply(update);
        tracing::info!(mint = %self.mint, "roles updated");
        Ok(*roles)
    }

    /// Register a new issuer. Requires the issuer-admin role.
    pub fn register_issuer(
        &self,
        caller: &Address,
        authority: Address,
        issuer_type: IssuerType,
        daily_mint_limit: u64,
        daily_burn_limit: u64,
        now: Timestamp,
    ) -> Result<Issuer, IssuanceError> {
        self.require_role(Role::IssuerAdmin, caller, "register_issuer")?;
        match self.issuers.entry(self.issuer_address(&authority)) {
            Entry::Occupied(_) => Err(IssuanceError::InvalidConfiguration(format!(
                "issuer {authority} is already registered"
            ))),
            Entry::Vacant(slot) => {
                let issuer = Issuer::new(authority, issuer_type, daily_mint_limit, daily_burn_limit, now);
                slot.insert(issuer.clone());
                tracing::info!(
                    mint = %self.mint,
                    issuer = %authority,
                    issuer_type = %issuer_type,
                    daily_mint_limit,
                    daily_burn_limit,
                    "issuer registered"
                );
                Ok(issuer)
            }
        }
    }

    /// Change an issuer's ceilings or active flag. Requires the issuer-admin
    /// role.
    pub fn update_issuer(
        &self,
        caller: &Address,
        authority: &Address,
        update: IssuerUpdate,
    ) -> Result<Issuer, IssuanceError> {
        self.require_role(Role::IssuerAdmin, caller, "update_issuer")?;
        let mut issuer = self
            .issuers
            .get_mut(&self.issuer_address(authority))
            .ok_or_else(|| self.issuer_not_found(authority))?;
        issuer.apply(update);
        let updated = issuer.value().clone();
        drop(issuer);
        tracing::info!(
            mint = %self.mint,
            issuer = %authority,
            daily_mint_limit = updated.daily_mint_limit,
            daily_burn_limit = updated.daily_burn_limit,
            is_active = updated.is_active,
            "issuer updated"
        );
        Ok(updated)
    }

    // ─── Mint and burn ──────────────────────────────────────────────

    fn check_reference(&self, reference: &Hash32) -> Result<(), IssuanceError> {
        if reference.is_zero() {
            return Ok(());
        }
        match &self.seen_references {
            Some(seen) if seen.lock().contains(reference) => {
                Err(IssuanceError::DuplicateReference(reference.to_hex()))
            }
            _ => Ok(()),
        }
    }

    fn remember_reference(&self, reference: Hash32) {
        if reference.is_zero() {
            return;
        }
        if let Some(seen) = &self.seen_references {
            seen.lock().insert(reference);
        }
    }

    /// Issue new units.
    ///
    /// Rejected when: amount is zero, issuance is paused, the issuer is
    /// unknown or inactive, the issuer's daily mint ceiling would be passed,
    /// the vault is not active, supply would exceed collateral, or the
    /// reference was already used (when deduplication is on).
    pub fn mint_tokens(&self, request: MintRequest, now: Timestamp) -> Result<MintReceipt, IssuanceError> {
        let result = self.apply_mint(request, now);
        match &result {
            Ok(receipt) => tracing::info!(
                mint = %self.mint,
                issuer = %request.issuer,
                recipient = %request.recipient,
                amount = request.amount,
                total_supply = receipt.total_supply,
                "minted"
            ),
            Err(err) => tracing::warn!(
                mint = %self.mint,
                issuer = %request.issuer,
                amount = request.amount,
                error = %err,
                "mint rejected"
            ),
        }
        result
    }

    fn apply_mint(&self, request: MintRequest, now: Timestamp) -> Result<MintReceipt, IssuanceError> {
        let MintRequest {
            issuer: authority,
            recipient,
            amount,
            reference,
        } = request;
        if amount == 0 {
            return Err(IssuanceError::InvalidAmount);
        }
        let mut guard = self.issuers.get_mut(&self.issuer_address(&authority));
        let mut config = self.config.write();
        if config.paused {
            return Err(IssuanceError::Paused);
        }
        let issuer = guard
            .as_deref_mut()
            .ok_or_else(|| self.issuer_not_found(&authority))?;
        issuer.require_active()?;
        issuer.check_mint(amount, now)?;

        let vault = self.vault.lock();
        vault.require_active()?;
        vault.check_mint(config.total_supply, amount)?;
        self.check_reference(&reference)?;

        self.ledger.mint_to(&recipient, amount)?;

        let volume = issuer.record_mint(amount, now)?;
        config.total_supply += amount;
        config.updated_at = now;
        self.remember_reference(reference);
        Ok(MintReceipt {
            issuer: authority,
            recipient,
            amount,
            reference,
            total_supply: config.total_supply,
            issuer_daily_volume: volume,
        })
    }

    /// Redeem units.
    ///
    /// Rejected when: amount is zero, issuance is paused, the issuer is
    /// unknown or inactive, the issuer's daily burn ceiling would be passed,
    /// the amount exceeds total supply or the holder's balance, or the
    /// reference was already used. On success the vault releases collateral
    /// in proportion to the burn.
    pub fn burn_tokens(&self, request: BurnRequest, now: Timestamp) -> Result<BurnReceipt, IssuanceError> {
        let result = self.apply_burn(request, now);
        match &result {
            Ok(receipt) => tracing::info!(
                mint = %self.mint,
                issuer = %request.issuer,
                holder = %request.holder,
                amount = request.amount,
                total_supply = receipt.total_supply,
                collateral_released = receipt.collateral_released,
                "burned"
            ),
            Err(err) => tracing::warn!(
                mint = %self.mint,
                issuer = %request.issuer,
                amount = request.amount,
                error = %err,
                "burn rejected"
            ),
        }
        result
    }

    fn apply_burn(&self, request: BurnRequest, now: Timestamp) -> Result<BurnReceipt, IssuanceError> {
        let BurnRequest {
            issuer: authority,
            holder,
            amount,
            redemption_info,
            reference,
        } = request;
        if amount == 0 {
            return Err(IssuanceError::InvalidAmount);
        }
        let mut guard = self.issuers.get_mut(&self.issuer_address(&authority));
        let mut config = self.config.write();
        if config.paused {
            return Err(IssuanceError::Paused);
        }
        let issuer = guard
            .as_deref_mut()
            .ok_or_else(|| self.issuer_not_found(&authority))?;
        issuer.require_active()?;
        issuer.check_burn(amount, now)?;
        if amount > config.total_supply {
            return Err(IssuanceError::InsufficientSupply {
                amount,
                supply: config.total_supply,
            });
        }
        let mut vault = self.vault.lock();
        self.check_reference(&reference)?;

        self.ledger.burn_from(&holder, amount)?;

        let volume = issuer.record_burn(amount, now)?;
        config.total_supply -= amount;
        config.updated_at = now;
        let released = vault.release_for_burn(amount, config.collateral_ratio_bps);
        self.remember_reference(reference);
        Ok(BurnReceipt {
            issuer: authority,
            holder,
            amount,
            redemption_info,
            total_supply: config.total_supply,
            collateral_released: released,
            issuer_daily_volume: volume,
        })
    }

    // ─── Seizure and freezing ───────────────────────────────────────

    /// Move tokens out of a frozen account into the treasury, outside the
    /// normal transfer rules.
    pub fn seize(&self, caller: &Address, request: SeizeRequest) -> Result<SeizeReceipt, IssuanceError> {
        let config = self.config();
        if !config.can_seize() {
            tracing::warn!(mint = %self.mint, caller = %caller, "rejected: seizure without permanent delegate");
            return Err(IssuanceError::PermanentDelegateNotEnabled);
        }
        match config.treasury {
            Some(treasury) if treasury == request.treasury => {}
            _ => return Err(IssuanceError::TreasuryNotConfigured),
        }
        self.require_role(Role::ComplianceOfficer, caller, "seize")?;
        if !self.ledger.is_frozen(&request.source) {
            return Err(IssuanceError::AccountNotFrozen(request.source.to_hex()));
        }
        let amount = if request.amount == 0 {
            self.ledger.balance_of(&request.source)
        } else {
            request.amount
        };
        if amount == 0 {
            return Err(IssuanceError::InvalidAmount);
        }
        self.ledger
            .force_transfer(&request.source, &request.treasury, amount)?;

        tracing::info!(
            mint = %self.mint,
            source = %request.source,
            treasury = %request.treasury,
            amount,
            reason = %request.reason,
            seized_by = %caller,
            "tokens seized"
        );
        Ok(SeizeReceipt {
            source: request.source,
            treasury: request.treasury,
            amount,
            reason: request.reason,
            seized_by: *caller,
        })
    }

    /// Freeze or thaw a token account. Requires the compliance-officer role.
    pub fn set_account_frozen(&self, caller: &Address, account: &Address, frozen: bool) -> Result<(), IssuanceError> {
        self.require_role(Role::ComplianceOfficer, caller, if frozen { "freeze" } else { "thaw" })?;
        self.ledger.set_frozen(account, frozen);
        tracing::info!(mint = %self.mint, account = %account, frozen, "account freeze state set");
        Ok(())
    }

    // ─── Pause ──────────────────────────────────────────────────────

    /// Stop issuance. Requires the pauser role.
    pub fn pause(&self, caller: &Address, now: Timestamp) -> Result<(), IssuanceError> {
        self.require_role(Role::Pauser, caller, "pause")?;
        self.set_paused(true, now)
    }

    /// Resume issuance. Requires the pauser role.
    pub fn unpause(&self, caller: &Address, now: Timestamp) -> Result<(), IssuanceError> {
        self.require_role(Role::Pauser, caller, "unpause")?;
        self.set_paused(false, now)
    }

    /// Pause on the strength of a custodian quorum instead of the pauser
    /// role.
    pub fn emergency_pause(
        &self,
        guard: &ThresholdGuard,
        shares: &[ShamirShare],
        now: Timestamp,
    ) -> Result<(), SssError> {
        if let Err(err) = guard.authorize(shares) {
            tracing::warn!(mint = %self.mint, supplied = shares.len(), error = %err, "emergency pause rejected");
            return Err(err.into());
        }
        self.set_paused(true, now)?;
        tracing::warn!(mint = %self.mint, "emergency pause by threshold authorization");
        Ok(())
    }

    fn set_paused(&self, paused: bool, now: Timestamp) -> Result<(), IssuanceError> {
        let mut config = self.config.write();
        match (config.paused, paused) {
            (true, true) => return Err(IssuanceError::AlreadyPaused),
            (false, false) => return Err(IssuanceError::NotPaused),
            _ => {}
        }
        config.paused = paused;
        config.updated_at = now;
        tracing::info!(mint = %self.mint, paused, "issuance pause state set");
        Ok(())
    }

    // ─── Collateral vault ───────────────────────────────────────────

    fn collateral_receipt(&self, total_collateral: u64, total_supply: u64) -> CollateralReceipt {
        CollateralReceipt {
            total_collateral,
            total_supply,
            collateral_ratio_bps: collateral_ratio_bps(total_collateral, total_supply),
        }
    }

    /// Record reserves added to the vault. Master authority only.
    pub fn deposit_collateral(
        &self,
        caller: &Address,
        amount: u64,
        proof_hash: Hash32,
    ) -> Result<CollateralReceipt, IssuanceError> {
        self.require_master(caller, "deposit_collateral")?;
        let config = self.config.read();
        let total = self.vault.lock().deposit(amount, proof_hash)?;
        tracing::info!(mint = %self.mint, amount, total_collateral = total, "collateral deposited");
        Ok(self.collateral_receipt(total, config.total_supply))
    }

    /// Record reserves leaving the vault. Refused if collateral would fall
    /// below supply. Master authority only.
    pub fn withdraw_collateral(
        &self,
        caller: &Address,
        amount: u64,
        proof_hash: Hash32,
    ) -> Result<CollateralReceipt, IssuanceError> {
        self.require_master(caller, "withdraw_collateral")?;
        let config = self.config.read();
        let total = self
            .vault
            .lock()
            .withdraw(amount, proof_hash, config.total_supply)?;
        tracing::info!(mint = %self.mint, amount, total_collateral = total, "collateral withdrawn");
        Ok(self.collateral_receipt(total, config.total_supply))
    }

    /// Replace the collateral figure with an audited one. Vault auditor only.
    pub fn submit_audit(
        &self,
        caller: &Address,
        verified_amount: u64,
        audit_hash: Hash32,
        now: Timestamp,
    ) -> Result<CollateralReceipt, IssuanceError> {
        let config = self.config.read();
        let mut vault = self.vault.lock();
        if vault.auditor.as_ref() != Some(caller) {
            drop(vault);
            tracing::warn!(mint = %self.mint, caller = %caller, "rejected: caller is not the vault auditor");
            return Err(IssuanceError::Unauthorized(
                "submit_audit requires the vault auditor".to_string(),
            ));
        }
        vault.record_audit(verified_amount, audit_hash, now);
        let receipt = self.collateral_receipt(vault.total_collateral, config.total_supply);
        tracing::info!(
            mint = %self.mint,
            verified_amount,
            collateral_ratio_bps = receipt.collateral_ratio_bps,
            "collateral audit recorded"
        );
        Ok(receipt)
    }

    /// Change the vault's operating status. Master authority only.
    pub fn set_vault_status(&self, caller: &Address, status: VaultStatus) -> Result<(), IssuanceError> {
        self.require_master(caller, "set_vault_status")?;
        self.vault.lock().status = status;
        tracing::info!(mint = %self.mint, status = status.as_str(), "vault status set");
        Ok(())
    }
}

impl std::fmt::Debug for IssuanceControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuanceControl")
            .field("mint", &self.mint)
            .field("config", &self.config())
            .field("vault", &self.vault())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use crate::preset::{FeatureFlags, Preset};
    use crate::vault::CollateralType;
    use sss_crypto::ThresholdScheme;

    const AUTHORITY: Address = Address([0x01; 32]);
    const ISSUER: Address = Address([0x11; 32]);
    const HOLDER: Address = Address([0x21; 32]);
    const TREASURY: Address = Address([0x7E; 32]);
    const AUDITOR: Address = Address([0xAD; 32]);

    fn now() -> Timestamp {
        Timestamp::from_epoch_secs(1_760_000_000).unwrap()
    }

    fn vault_init() -> VaultInit {
        VaultInit {
            collateral_type: CollateralType::BankDeposit,
            auditor: Some(AUDITOR),
        }
    }

    fn control(init: MintInit) -> (IssuanceControl, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let control =
            IssuanceControl::initialize(Address([0x4D; 32]), init, vault_init(), ledger.clone(), now()).unwrap();
        control
            .register_issuer(&AUTHORITY, ISSUER, IssuerType::TrustBank, 0, 0, now())
            .unwrap();
        (control, ledger)
    }

    fn mint_req(amount: u64) -> MintRequest {
        MintRequest {
            issuer: ISSUER,
            recipient: HOLDER,
            amount,
            reference: Hash32::ZERO,
        }
    }

    fn burn_req(amount: u64) -> BurnRequest {
        BurnRequest {
            issuer: ISSUER,
            holder: HOLDER,
            amount,
            redemption_info: RedemptionInfo::ZERO,
            reference: Hash32::ZERO,
        }
    }

    #[test]
    fn test_mint_requires_collateral() {
        let (control, ledger) = control(MintInit::sss1(AUTHORITY, 2));
        assert_eq!(
            control.mint_tokens(mint_req(1), now()),
            Err(IssuanceError::CollateralInsufficient {
                supply: 0,
                amount: 1,
                collateral: 0
            })
        );
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        let receipt = control.mint_tokens(mint_req(1_000), now()).unwrap();
        assert_eq!(receipt.total_supply, 1_000);
        assert_eq!(ledger.balance_of(&HOLDER), 1_000);
        assert!(control.mint_tokens(mint_req(1), now()).is_err());
        assert_eq!(control.collateral_ratio_bps(), 10_000);
    }

    #[test]
    fn test_mint_rejections_change_nothing() {
        let (control, ledger) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 100, Hash32::ZERO).unwrap();
        assert_eq!(control.mint_tokens(mint_req(0), now()), Err(IssuanceError::InvalidAmount));
        let unknown = MintRequest {
            issuer: Address([0x99; 32]),
            ..mint_req(10)
        };
        assert!(matches!(
            control.mint_tokens(unknown, now()),
            Err(IssuanceError::NotFound { record: "issuer", .. })
        ));
        assert_eq!(control.total_supply(), 0);
        assert_eq!(ledger.balance_of(&HOLDER), 0);
        assert_eq!(control.issuer(&ISSUER).unwrap().total_minted, 0);
    }

    #[test]
    fn test_issuer_daily_mint_limit() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 10_000, Hash32::ZERO).unwrap();
        control
            .update_issuer(
                &AUTHORITY,
                &ISSUER,
                IssuerUpdate {
                    daily_mint_limit: Some(500),
                    ..IssuerUpdate::default()
                },
            )
            .unwrap();
        control.mint_tokens(mint_req(400), now()).unwrap();
        assert!(matches!(
            control.mint_tokens(mint_req(101), now()),
            Err(IssuanceError::DailyLimitExceeded { operation: "mint", .. })
        ));
        assert_eq!(control.total_supply(), 400);
    }

    #[test]
    fn test_concurrent_issuance_never_exceeds_issuer_ceilings() {
        let (control, ledger) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 10_000, Hash32::ZERO).unwrap();
        control
            .update_issuer(
                &AUTHORITY,
                &ISSUER,
                IssuerUpdate {
                    daily_mint_limit: Some(1_000),
                    daily_burn_limit: Some(500),
                    ..IssuerUpdate::default()
                },
            )
            .unwrap();

        let race = |op: &(dyn Fn() -> bool + Sync)| -> usize {
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|_| scope.spawn(|| (0..50).filter(|_| op()).count()))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).sum()
            })
        };

        let minted = race(&|| control.mint_tokens(mint_req(7), now()).is_ok());
        assert_eq!(minted, 1_000 / 7);
        assert_eq!(control.total_supply(), (1_000 / 7) * 7);
        assert_eq!(ledger.balance_of(&HOLDER), control.total_supply());

        let burned = race(&|| control.burn_tokens(burn_req(7), now()).is_ok());
        assert_eq!(burned, 500 / 7);
        let issuer = control.issuer(&ISSUER).unwrap();
        assert_eq!(issuer.total_minted, (1_000 / 7) * 7);
        assert_eq!(issuer.total_burned, (500 / 7) * 7);
        assert_eq!(control.total_supply(), ledger.balance_of(&HOLDER));
    }

    #[test]
    fn test_inactive_issuer_rejected() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 100, Hash32::ZERO).unwrap();
        control
            .update_issuer(
                &AUTHORITY,
                &ISSUER,
                IssuerUpdate {
                    is_active: Some(false),
                    ..IssuerUpdate::default()
                },
            )
            .unwrap();
        assert!(matches!(
            control.mint_tokens(mint_req(1), now()),
            Err(IssuanceError::IssuerInactive(_))
        ));
    }

    #[test]
    fn test_register_issuer_requires_issuer_admin() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        let admin = Address([0x0A; 32]);
        assert!(matches!(
            control.register_issuer(&admin, Address([0x12; 32]), IssuerType::Exchange, 0, 0, now()),
            Err(IssuanceError::Unauthorized(_))
        ));
        control
            .update_roles(
                &AUTHORITY,
                RoleUpdate {
                    issuer_admin: Some(Some(admin)),
                    ..RoleUpdate::default()
                },
            )
            .unwrap();
        control
            .register_issuer(&admin, Address([0x12; 32]), IssuerType::Exchange, 0, 0, now())
            .unwrap();
        assert!(control
            .register_issuer(&admin, Address([0x12; 32]), IssuerType::Exchange, 0, 0, now())
            .is_err());
        assert!(control.update_roles(&admin, RoleUpdate::default()).is_err());
    }

    #[test]
    fn test_burn_releases_collateral() {
        let (control, ledger) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        control.mint_tokens(mint_req(800), now()).unwrap();
        let receipt = control.burn_tokens(burn_req(300), now()).unwrap();
        assert_eq!(receipt.total_supply, 500);
        assert_eq!(receipt.collateral_released, 300);
        assert_eq!(control.vault().total_collateral, 700);
        assert_eq!(ledger.balance_of(&HOLDER), 500);
        assert_eq!(control.issuer(&ISSUER).unwrap().total_burned, 300);
    }

    #[test]
    fn test_burn_beyond_balance_or_supply() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        control.mint_tokens(mint_req(100), now()).unwrap();
        assert_eq!(
            control.burn_tokens(burn_req(101), now()),
            Err(IssuanceError::InsufficientSupply {
                amount: 101,
                supply: 100
            })
        );
        let other_holder = BurnRequest {
            holder: Address([0x22; 32]),
            ..burn_req(50)
        };
        assert!(matches!(
            control.burn_tokens(other_holder, now()),
            Err(IssuanceError::InsufficientBalance { .. })
        ));
        assert_eq!(control.total_supply(), 100);
        assert_eq!(control.vault().total_collateral, 1_000);
    }

    #[test]
    fn test_pause_blocks_issuance_only() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        control.mint_tokens(mint_req(100), now()).unwrap();
        control.pause(&AUTHORITY, now()).unwrap();
        assert_eq!(control.pause(&AUTHORITY, now()), Err(IssuanceError::AlreadyPaused));
        assert_eq!(control.mint_tokens(mint_req(1), now()), Err(IssuanceError::Paused));
        assert_eq!(control.burn_tokens(burn_req(1), now()), Err(IssuanceError::Paused));
        // The ledger itself still moves.
        control.ledger().transfer(&HOLDER, &Address([0x22; 32]), 10).unwrap();
        control.unpause(&AUTHORITY, now()).unwrap();
        assert_eq!(control.unpause(&AUTHORITY, now()), Err(IssuanceError::NotPaused));
        assert!(control.mint_tokens(mint_req(1), now()).is_ok());
    }

    #[test]
    fn test_pause_requires_pauser() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        let pauser = Address([0x0B; 32]);
        assert!(matches!(control.pause(&pauser, now()), Err(IssuanceError::Unauthorized(_))));
        control
            .update_roles(
                &AUTHORITY,
                RoleUpdate {
                    pauser: Some(Some(pauser)),
                    ..RoleUpdate::default()
                },
            )
            .unwrap();
        control.pause(&pauser, now()).unwrap();
        assert!(control.is_paused());
    }

    #[test]
    fn test_seize_requires_permanent_delegate() {
        let (control, ledger) = control(MintInit::sss1(AUTHORITY, 2));
        ledger.set_frozen(&HOLDER, true);
        let request = SeizeRequest {
            source: HOLDER,
            treasury: TREASURY,
            amount: 0,
            reason: Hash32::from_code("sanctions"),
        };
        assert_eq!(
            control.seize(&AUTHORITY, request),
            Err(IssuanceError::PermanentDelegateNotEnabled)
        );
    }

    #[test]
    fn test_seize_whole_balance_from_frozen_account() {
        let (control, ledger) = control(MintInit::sss2(AUTHORITY, 6, TREASURY));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        ledger.set_frozen(&HOLDER, false);
        control.mint_tokens(mint_req(750), now()).unwrap();
        let request = SeizeRequest {
            source: HOLDER,
            treasury: TREASURY,
            amount: 0,
            reason: Hash32::from_code("court-order"),
        };
        assert!(matches!(
            control.seize(&AUTHORITY, request),
            Err(IssuanceError::AccountNotFrozen(_))
        ));
        control.set_account_frozen(&AUTHORITY, &HOLDER, true).unwrap();
        let receipt = control.seize(&AUTHORITY, request).unwrap();
        assert_eq!(receipt.amount, 750);
        assert_eq!(ledger.balance_of(&HOLDER), 0);
        assert_eq!(ledger.balance_of(&TREASURY), 750);
        // Supply is unchanged by seizure.
        assert_eq!(control.total_supply(), 750);
        // Nothing left to seize.
        assert_eq!(control.seize(&AUTHORITY, request), Err(IssuanceError::InvalidAmount));
    }

    #[test]
    fn test_seize_checks_treasury_and_role() {
        let (control, ledger) = control(MintInit::sss2(AUTHORITY, 6, TREASURY));
        ledger.set_frozen(&HOLDER, true);
        let wrong_treasury = SeizeRequest {
            source: HOLDER,
            treasury: Address([0x7F; 32]),
            amount: 5,
            reason: Hash32::ZERO,
        };
        assert_eq!(
            control.seize(&AUTHORITY, wrong_treasury),
            Err(IssuanceError::TreasuryNotConfigured)
        );
        let request = SeizeRequest {
            treasury: TREASURY,
            ..wrong_treasury
        };
        assert!(matches!(
            control.seize(&Address([0x33; 32]), request),
            Err(IssuanceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_custom_delegate_without_treasury() {
        let init = MintInit {
            preset: Preset::Custom,
            flags: Some(FeatureFlags {
                permanent_delegate: true,
                ..FeatureFlags::NONE
            }),
            ..MintInit::sss1(AUTHORITY, 6)
        };
        let (control, ledger) = control(init);
        ledger.set_frozen(&HOLDER, true);
        let request = SeizeRequest {
            source: HOLDER,
            treasury: TREASURY,
            amount: 0,
            reason: Hash32::ZERO,
        };
        assert_eq!(control.seize(&AUTHORITY, request), Err(IssuanceError::TreasuryNotConfigured));
    }

    #[test]
    fn test_withdraw_and_audit() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        control.mint_tokens(mint_req(600), now()).unwrap();
        assert!(matches!(
            control.withdraw_collateral(&AUTHORITY, 401, Hash32::ZERO),
            Err(IssuanceError::CollateralRatioViolation { .. })
        ));
        let receipt = control.withdraw_collateral(&AUTHORITY, 400, Hash32::ZERO).unwrap();
        assert_eq!(receipt.collateral_ratio_bps, 10_000);

        assert!(matches!(
            control.submit_audit(&AUTHORITY, 900, Hash32([3; 32]), now()),
            Err(IssuanceError::Unauthorized(_))
        ));
        let receipt = control.submit_audit(&AUDITOR, 900, Hash32([3; 32]), now()).unwrap();
        assert_eq!(receipt.collateral_ratio_bps, 15_000);
        assert_eq!(control.vault().last_audit_hash, Hash32([3; 32]));
    }

    #[test]
    fn test_inactive_vault_blocks_mint() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        control.set_vault_status(&AUTHORITY, VaultStatus::UnderAudit).unwrap();
        assert_eq!(
            control.mint_tokens(mint_req(1), now()),
            Err(IssuanceError::VaultInactive("under_audit".to_string()))
        );
    }

    #[test]
    fn test_reference_dedup_is_opt_in() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        let req = MintRequest {
            reference: Hash32([0x42; 32]),
            ..mint_req(10)
        };
        control.mint_tokens(req, now()).unwrap();
        control.mint_tokens(req, now()).unwrap();

        let (control, _) = self::control(MintInit::sss1(AUTHORITY, 2));
        let control = control.with_reference_dedup(true);
        control.deposit_collateral(&AUTHORITY, 1_000, Hash32::ZERO).unwrap();
        control.mint_tokens(req, now()).unwrap();
        assert_eq!(
            control.mint_tokens(req, now()),
            Err(IssuanceError::DuplicateReference(Hash32([0x42; 32]).to_hex()))
        );
        // Zero references are never deduplicated.
        control.mint_tokens(mint_req(10), now()).unwrap();
        control.mint_tokens(mint_req(10), now()).unwrap();
        assert_eq!(control.total_supply(), 30);
    }

    #[test]
    fn test_emergency_pause_with_quorum() {
        let (control, _) = control(MintInit::sss1(AUTHORITY, 2));
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let (guard, shares) = ThresholdGuard::provision(scheme, b"emergency").unwrap();
        assert!(matches!(
            control.emergency_pause(&guard, &shares[..2], now()),
            Err(SssError::Crypto(_))
        ));
        assert!(!control.is_paused());
        control.emergency_pause(&guard, &shares[2..], now()).unwrap();
        assert!(control.is_paused());
    }
}
