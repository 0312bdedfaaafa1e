//! # Collateral Vault
//!
//! Accounting record for the off-ledger reserves backing a token.
//!
//! ## Security Invariant
//!
//! Total supply never exceeds vault collateral through any operation issuance
//! control performs: mint is refused past the collateral, and a withdrawal
//! that would leave collateral below supply is refused. Only an audit can
//! report a lower figure, since it records what the auditor verified.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sss_core::{Address, Hash32, IssuanceError, Timestamp};

use crate::config::FULL_BACKING_BPS;

/// What backs the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralType {
    Fiat,
    GovernmentBond,
    BankDeposit,
    Other,
}

impl FromStr for CollateralType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fiat" => Ok(Self::Fiat),
            "government_bond" => Ok(Self::GovernmentBond),
            "bank_deposit" => Ok(Self::BankDeposit),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown collateral type: {other:?}")),
        }
    }
}

/// Operating status of the vault. Only `Active` accepts deposits,
/// withdrawals and backs new mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultStatus {
    Active,
    Suspended,
    UnderAudit,
    Closed,
}

impl VaultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::UnderAudit => "under_audit",
            Self::Closed => "closed",
        }
    }
}

/// Vault parameters supplied at token initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInit {
    pub collateral_type: CollateralType,
    pub auditor: Option<Address>,
}

/// The vault record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralVault {
    pub collateral_type: CollateralType,
    pub auditor: Option<Address>,
    pub total_collateral: u64,
    pub status: VaultStatus,
    pub last_audit_hash: Hash32,
    pub last_audit_at: Timestamp,
    /// Proof hash of the most recent deposit or withdrawal.
    pub last_proof_hash: Hash32,
}

impl CollateralVault {
    pub fn new(init: VaultInit, now: Timestamp) -> Self {
        Self {
            collateral_type: init.collateral_type,
            auditor: init.auditor,
            total_collateral: 0,
            status: VaultStatus::Active,
            last_audit_hash: Hash32::ZERO,
            last_audit_at: now,
            last_proof_hash: Hash32::ZERO,
        }
    }

    pub(crate) fn require_active(&self) -> Result<(), IssuanceError> {
        match self.status {
            VaultStatus::Active => Ok(()),
            other => Err(IssuanceError::VaultInactive(other.as_str().to_string())),
        }
    }

    /// Whether `supply + amount` stays within collateral.
    pub fn check_mint(&self, supply: u64, amount: u64) -> Result<(), IssuanceError> {
        let next = supply
            .checked_add(amount)
            .ok_or(IssuanceError::Overflow("total supply"))?;
        if next > self.total_collateral {
            return Err(IssuanceError::CollateralInsufficient {
                supply,
                amount,
                collateral: self.total_collateral,
            });
        }
        Ok(())
    }

    pub(crate) fn deposit(&mut self, amount: u64, proof_hash: Hash32) -> Result<u64, IssuanceError> {
        self.require_active()?;
        self.total_collateral = self
            .total_collateral
            .checked_add(amount)
            .ok_or(IssuanceError::Overflow("vault collateral"))?;
        self.last_proof_hash = proof_hash;
        Ok(self.total_collateral)
    }

    pub(crate) fn withdraw(
        &mut self,
        amount: u64,
        proof_hash: Hash32,
        supply: u64,
    ) -> Result<u64, IssuanceError> {
        self.require_active()?;
        let remaining = self.total_collateral.checked_sub(amount).ok_or(
            IssuanceError::CollateralRatioViolation {
                collateral: 0,
                supply,
            },
        )?;
        if remaining < supply {
            return Err(IssuanceError::CollateralRatioViolation {
                collateral: remaining,
                supply,
            });
        }
        self.total_collateral = remaining;
        self.last_proof_hash = proof_hash;
        Ok(remaining)
    }

    /// Redemption: collateral leaves the vault in proportion to the burn.
    pub(crate) fn release_for_burn(&mut self, amount: u64, ratio_bps: u64) -> u64 {
        let released = (u128::from(amount) * u128::from(ratio_bps) / u128::from(FULL_BACKING_BPS))
            .min(u128::from(u64::MAX)) as u64;
        self.total_collateral = self.total_collateral.saturating_sub(released);
        released
    }

    pub(crate) fn record_audit(&mut self, verified_amount: u64, audit_hash: Hash32, now: Timestamp) {
        self.total_collateral = verified_amount;
        self.last_audit_hash = audit_hash;
        self.last_audit_at = now;
        self.status = VaultStatus::Active;
    }
}

/// Live collateral ratio in basis points; full backing when nothing is issued.
pub fn collateral_ratio_bps(collateral: u64, supply: u64) -> u64 {
    if supply == 0 {
        return FULL_BACKING_BPS;
    }
    let ratio = u128::from(collateral) * u128::from(FULL_BACKING_BPS) / u128::from(supply);
    ratio.min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> CollateralVault {
        CollateralVault::new(
            VaultInit {
                collateral_type: CollateralType::Fiat,
                auditor: None,
            },
            Timestamp::default(),
        )
    }

    #[test]
    fn test_mint_check_against_collateral() {
        let mut v = vault();
        v.deposit(1_000, Hash32::ZERO).unwrap();
        assert!(v.check_mint(400, 600).is_ok());
        assert_eq!(
            v.check_mint(400, 601),
            Err(IssuanceError::CollateralInsufficient {
                supply: 400,
                amount: 601,
                collateral: 1_000
            })
        );
        assert_eq!(v.check_mint(1, u64::MAX), Err(IssuanceError::Overflow("total supply")));
    }

    #[test]
    fn test_withdraw_preserves_backing() {
        let mut v = vault();
        v.deposit(1_000, Hash32::ZERO).unwrap();
        assert_eq!(v.withdraw(300, Hash32([1; 32]), 700).unwrap(), 700);
        assert_eq!(
            v.withdraw(1, Hash32::ZERO, 700),
            Err(IssuanceError::CollateralRatioViolation {
                collateral: 699,
                supply: 700
            })
        );
        assert_eq!(v.total_collateral, 700);
        assert_eq!(v.last_proof_hash, Hash32([1; 32]));
    }

    #[test]
    fn test_inactive_vault_refuses_movements() {
        let mut v = vault();
        v.status = VaultStatus::Suspended;
        assert_eq!(
            v.deposit(1, Hash32::ZERO),
            Err(IssuanceError::VaultInactive("suspended".to_string()))
        );
        v.record_audit(500, Hash32([2; 32]), Timestamp::default());
        assert_eq!(v.status, VaultStatus::Active);
        assert_eq!(v.total_collateral, 500);
    }

    #[test]
    fn test_release_for_burn_never_underflows() {
        let mut v = vault();
        v.deposit(100, Hash32::ZERO).unwrap();
        assert_eq!(v.release_for_burn(40, FULL_BACKING_BPS), 40);
        assert_eq!(v.total_collateral, 60);
        v.release_for_burn(1_000, FULL_BACKING_BPS);
        assert_eq!(v.total_collateral, 0);
    }

    #[test]
    fn test_collateral_ratio() {
        assert_eq!(collateral_ratio_bps(0, 0), 10_000);
        assert_eq!(collateral_ratio_bps(1_500, 1_000), 15_000);
        assert_eq!(collateral_ratio_bps(500, 1_000), 5_000);
    }
}
