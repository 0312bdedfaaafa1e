//! # Transfer Gate
//!
//! The decision function run on every attempted transfer.
//!
//! Evaluation order for a sender, first match wins:
//!
//! 1. registry inactive
//! 2. active blacklist entry
//! 3. no active whitelist entry
//! 4. `expiry < now`
//! 5. `daily_limit > 0` and `volume + amount > daily_limit`, with the volume
//!    of a stale epoch counted as zero
//!
//! [`ComplianceRegistry::check_transfer_eligible`] is a pure check and never
//! writes. [`ComplianceRegistry::execute_transfer`] re-evaluates under the
//! sender record's lock and commits the volume increment in the same step.

use serde::{Deserialize, Serialize};
use sss_core::{Address, ComplianceError, Jurisdiction, Timestamp};

use crate::registry::{ComplianceRegistry, WhitelistEntry};

/// Why a wallet may not transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    RegistryInactive,
    Blacklisted,
    NotWhitelisted,
    Expired {
        expired_at: Timestamp,
    },
    DailyLimitExceeded {
        volume: u64,
        amount: u64,
        limit: u64,
    },
    JurisdictionRestricted {
        jurisdiction: Jurisdiction,
    },
}

impl DenialReason {
    /// The typed rejection for `wallet`.
    pub fn into_error(self, wallet: &Address) -> ComplianceError {
        let wallet = wallet.to_hex();
        match self {
            Self::RegistryInactive => ComplianceError::RegistryInactive,
            Self::Blacklisted => ComplianceError::Blacklisted { wallet },
            Self::NotWhitelisted => ComplianceError::NotWhitelisted { wallet },
            Self::Expired { expired_at } => ComplianceError::Expired {
                wallet,
                expired_at: expired_at.epoch_secs(),
            },
            Self::DailyLimitExceeded {
                volume,
                amount,
                limit,
            } => ComplianceError::DailyLimitExceeded {
                volume,
                amount,
                limit,
            },
            Self::JurisdictionRestricted { jurisdiction } => {
                ComplianceError::JurisdictionNotAllowed {
                    jurisdiction,
                    operation: "transfer",
                }
            }
        }
    }
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Denied(DenialReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// `Ok(())` when eligible, otherwise the typed rejection for `wallet`.
    pub fn into_result(self, wallet: &Address) -> Result<(), ComplianceError> {
        match self {
            Self::Eligible => Ok(()),
            Self::Denied(reason) => Err(reason.into_error(wallet)),
        }
    }
}

/// A committed transfer as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub sender: Address,
    pub recipient: Address,
    pub amount: u64,
    /// Sender's volume in the current epoch after this transfer.
    pub sender_daily_volume: u64,
}

/// Steps 3 to 5 against a whitelist record, without the limit when
/// `amount` is `None`.
fn screen_entry(entry: Option<&WhitelistEntry>, amount: Option<u64>, now: Timestamp) -> Eligibility {
    let entry = match entry {
        Some(entry) if entry.is_active => entry,
        _ => return Eligibility::Denied(DenialReason::NotWhitelisted),
    };
    if entry.is_expired(now) {
        return Eligibility::Denied(DenialReason::Expired {
            expired_at: entry.expiry,
        });
    }
    if let Some(amount) = amount {
        if let Err(exceeded) = entry.counter.check(amount, entry.daily_limit, now) {
            return Eligibility::Denied(DenialReason::DailyLimitExceeded {
                volume: exceeded.volume,
                amount: exceeded.amount,
                limit: exceeded.limit,
            });
        }
    }
    Eligibility::Eligible
}

impl ComplianceRegistry {
    /// Whether `wallet` may send `amount` at `now`. Pure: no record changes.
    pub fn check_transfer_eligible(&self, wallet: &Address, amount: u64, now: Timestamp) -> Eligibility {
        if !self.is_active() {
            return Eligibility::Denied(DenialReason::RegistryInactive);
        }
        if self.is_blacklisted(wallet) {
            return Eligibility::Denied(DenialReason::Blacklisted);
        }
        let entry = self.whitelist.get(&self.whitelist_address(wallet));
        screen_entry(entry.as_deref(), Some(amount), now)
    }

    /// Whether `wallet` may receive at `now`: blacklist always, whitelist and
    /// expiry when the registry requires recipients to be whitelisted, and the
    /// transfer-time jurisdiction policy when the wallet has an entry.
    pub fn check_receive_eligible(&self, wallet: &Address, now: Timestamp) -> Eligibility {
        if !self.is_active() {
            return Eligibility::Denied(DenialReason::RegistryInactive);
        }
        if self.is_blacklisted(wallet) {
            return Eligibility::Denied(DenialReason::Blacklisted);
        }
        let entry = self.whitelist_entry(wallet);
        if self.require_recipient_whitelisted {
            let screened = screen_entry(entry.as_ref(), None, now);
            if !screened.is_eligible() {
                return screened;
            }
        }
        match entry {
            Some(entry) if entry.is_active && !self.jurisdictions.allows_transfer(entry.jurisdiction) => {
                Eligibility::Denied(DenialReason::JurisdictionRestricted {
                    jurisdiction: entry.jurisdiction,
                })
            }
            _ => Eligibility::Eligible,
        }
    }

    /// Screen both parties and commit `amount` against the sender's daily
    /// volume.
    ///
    /// The sender is evaluated first, so a transfer between two ineligible
    /// wallets reports the sender's reason. On any rejection no record
    /// changes.
    pub fn execute_transfer(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: u64,
        now: Timestamp,
    ) -> Result<TransferReceipt, ComplianceError> {
        self.execute_transfer_with(sender, recipient, amount, now, || Ok(()))
    }

    /// [`execute_transfer`](Self::execute_transfer) with a settlement step.
    ///
    /// `settle` runs after every check has passed and while the sender's
    /// record is locked. The volume is committed only if it returns `Ok`, so
    /// a balance move performed inside `settle` and the volume increment
    /// either both happen or neither does.
    pub fn execute_transfer_with<E, F>(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: u64,
        now: Timestamp,
        settle: F,
    ) -> Result<TransferReceipt, E>
    where
        E: From<ComplianceError>,
        F: FnOnce() -> Result<(), E>,
    {
        if let Eligibility::Denied(reason) = self.check_transfer_eligible(sender, amount, now) {
            return Err(self.deny(sender, "sender", reason).into());
        }
        if let Eligibility::Denied(reason) = self.check_receive_eligible(recipient, now) {
            return Err(self.deny(recipient, "recipient", reason).into());
        }

        // Re-run the sender checks under the record lock; state may have
        // moved since the check.
        if self.is_blacklisted(sender) {
            return Err(self.deny(sender, "sender", DenialReason::Blacklisted).into());
        }
        let mut record = self
            .whitelist
            .get_mut(&self.whitelist_address(sender))
            .ok_or_else(|| self.deny(sender, "sender", DenialReason::NotWhitelisted))?;
        let reason = match screen_entry(Some(record.value()), Some(amount), now) {
            Eligibility::Denied(reason) => Some(reason),
            Eligibility::Eligible if !self.jurisdictions.allows_transfer(record.jurisdiction) => {
                Some(DenialReason::JurisdictionRestricted {
                    jurisdiction: record.jurisdiction,
                })
            }
            Eligibility::Eligible => None,
        };
        if let Some(reason) = reason {
            drop(record);
            return Err(self.deny(sender, "sender", reason).into());
        }

        settle()?;

        let limit = record.daily_limit;
        let volume = record
            .counter
            .commit(amount, limit, now)
            .map_err(|exceeded| ComplianceError::DailyLimitExceeded {
                volume: exceeded.volume,
                amount: exceeded.amount,
                limit: exceeded.limit,
            })?;
        record.last_activity = now;
        drop(record);

        tracing::info!(
            mint = %self.mint(),
            sender = %sender,
            recipient = %recipient,
            amount,
            daily_volume = volume,
            "transfer committed"
        );
        Ok(TransferReceipt {
            sender: *sender,
            recipient: *recipient,
            amount,
            sender_daily_volume: volume,
        })
    }

    fn deny(&self, wallet: &Address, party: &str, reason: DenialReason) -> ComplianceError {
        tracing::debug!(mint = %self.mint(), wallet = %wallet, party, ?reason, "transfer denied");
        reason.into_error(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Enrollment, KycLevel};
    use sss_core::{Hash32, PolicyConfig, SECONDS_PER_DAY};

    const AUTH: Address = Address([0x01; 32]);
    const DAY_START: i64 = 20_000 * SECONDS_PER_DAY;

    fn addr(b: u8) -> Address {
        Address([b; 32])
    }

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    fn enroll(reg: &ComplianceRegistry, wallet: Address, daily_limit: u64, expiry: i64) {
        reg.add_to_whitelist(
            &AUTH,
            wallet,
            Enrollment {
                kyc_level: KycLevel::Standard,
                jurisdiction: Jurisdiction::Singapore,
                kyc_hash: Hash32([1; 32]),
                daily_limit,
                expiry: ts(expiry),
            },
            ts(DAY_START),
        )
        .unwrap();
    }

    fn registry() -> ComplianceRegistry {
        ComplianceRegistry::new(addr(0xAA), AUTH)
    }

    #[test]
    fn test_unknown_wallet_is_not_whitelisted() {
        let reg = registry();
        assert_eq!(
            reg.check_transfer_eligible(&addr(0x10), 1, ts(DAY_START)),
            Eligibility::Denied(DenialReason::NotWhitelisted)
        );
    }

    #[test]
    fn test_removed_entry_is_not_whitelisted() {
        let reg = registry();
        enroll(&reg, addr(0x10), 0, DAY_START + 100);
        reg.remove_from_whitelist(&AUTH, &addr(0x10)).unwrap();
        assert_eq!(
            reg.check_transfer_eligible(&addr(0x10), 1, ts(DAY_START)),
            Eligibility::Denied(DenialReason::NotWhitelisted)
        );
    }

    #[test]
    fn test_blacklist_overrides_whitelist() {
        let reg = registry();
        enroll(&reg, addr(0x10), 0, DAY_START + 100);
        reg.add_to_blacklist(&AUTH, addr(0x10), "fraud", ts(DAY_START)).unwrap();
        assert_eq!(
            reg.check_transfer_eligible(&addr(0x10), 1, ts(DAY_START)),
            Eligibility::Denied(DenialReason::Blacklisted)
        );
        reg.remove_from_blacklist(&AUTH, &addr(0x10), ts(DAY_START)).unwrap();
        assert!(reg.check_transfer_eligible(&addr(0x10), 1, ts(DAY_START)).is_eligible());
    }

    #[test]
    fn test_expiry_is_strictly_before_now() {
        let reg = registry();
        enroll(&reg, addr(0x10), 0, DAY_START + 100);
        assert!(reg
            .check_transfer_eligible(&addr(0x10), 1, ts(DAY_START + 100))
            .is_eligible());
        assert_eq!(
            reg.check_transfer_eligible(&addr(0x10), 1, ts(DAY_START + 101)),
            Eligibility::Denied(DenialReason::Expired {
                expired_at: ts(DAY_START + 100)
            })
        );
    }

    #[test]
    fn test_check_does_not_commit_volume() {
        let reg = registry();
        enroll(&reg, addr(0x10), 100, DAY_START + SECONDS_PER_DAY * 30);
        for _ in 0..5 {
            assert!(reg.check_transfer_eligible(&addr(0x10), 100, ts(DAY_START)).is_eligible());
        }
        assert_eq!(reg.whitelist_entry(&addr(0x10)).unwrap().counter.volume, 0);
    }

    #[test]
    fn test_execute_commits_and_enforces_limit() {
        let reg = registry();
        enroll(&reg, addr(0x10), 100, DAY_START + SECONDS_PER_DAY * 30);
        enroll(&reg, addr(0x11), 0, DAY_START + SECONDS_PER_DAY * 30);
        let now = ts(DAY_START + 60);

        let receipt = reg.execute_transfer(&addr(0x10), &addr(0x11), 60, now).unwrap();
        assert_eq!(receipt.sender_daily_volume, 60);
        assert_eq!(reg.whitelist_entry(&addr(0x10)).unwrap().last_activity, now);

        let err = reg.execute_transfer(&addr(0x10), &addr(0x11), 41, now).unwrap_err();
        assert_eq!(
            err,
            ComplianceError::DailyLimitExceeded {
                volume: 60,
                amount: 41,
                limit: 100
            }
        );
        assert_eq!(reg.whitelist_entry(&addr(0x10)).unwrap().counter.volume, 60);

        reg.execute_transfer(&addr(0x10), &addr(0x11), 40, now).unwrap();
        assert_eq!(reg.whitelist_entry(&addr(0x10)).unwrap().counter.volume, 100);
    }

    #[test]
    fn test_failed_settlement_commits_nothing() {
        let reg = registry();
        enroll(&reg, addr(0x10), 100, DAY_START + SECONDS_PER_DAY * 30);
        enroll(&reg, addr(0x11), 0, DAY_START + SECONDS_PER_DAY * 30);
        let now = ts(DAY_START + 60);

        let err = reg
            .execute_transfer_with(&addr(0x10), &addr(0x11), 60, now, || {
                Err(ComplianceError::Unauthorized("ledger refused".to_string()))
            })
            .unwrap_err();
        assert_eq!(err, ComplianceError::Unauthorized("ledger refused".to_string()));
        let entry = reg.whitelist_entry(&addr(0x10)).unwrap();
        assert_eq!(entry.counter.volume, 0);
        assert_ne!(entry.last_activity, now);

        let mut settled = false;
        reg.execute_transfer_with(&addr(0x10), &addr(0x11), 60, now, || {
            settled = true;
            Ok::<(), ComplianceError>(())
        })
        .unwrap();
        assert!(settled);
        assert_eq!(reg.whitelist_entry(&addr(0x10)).unwrap().counter.volume, 60);
    }

    #[test]
    fn test_new_epoch_ignores_prior_volume() {
        let reg = registry();
        enroll(&reg, addr(0x10), 100, DAY_START + SECONDS_PER_DAY * 30);
        enroll(&reg, addr(0x11), 0, DAY_START + SECONDS_PER_DAY * 30);
        reg.execute_transfer(&addr(0x10), &addr(0x11), 100, ts(DAY_START)).unwrap();
        assert!(!reg
            .check_transfer_eligible(&addr(0x10), 1, ts(DAY_START + 10))
            .is_eligible());
        let next_day = ts(DAY_START + SECONDS_PER_DAY);
        let receipt = reg.execute_transfer(&addr(0x10), &addr(0x11), 100, next_day).unwrap();
        assert_eq!(receipt.sender_daily_volume, 100);
    }

    #[test]
    fn test_recipient_screening() {
        let reg = registry();
        enroll(&reg, addr(0x10), 0, DAY_START + 1_000);
        let now = ts(DAY_START);
        let err = reg.execute_transfer(&addr(0x10), &addr(0x12), 5, now).unwrap_err();
        assert!(matches!(err, ComplianceError::NotWhitelisted { .. }));

        enroll(&reg, addr(0x12), 0, DAY_START + 1_000);
        reg.add_to_blacklist(&AUTH, addr(0x12), "sanctions", now).unwrap();
        let err = reg.execute_transfer(&addr(0x10), &addr(0x12), 5, now).unwrap_err();
        assert!(matches!(err, ComplianceError::Blacklisted { .. }));
        assert_eq!(reg.whitelist_entry(&addr(0x10)).unwrap().counter.volume, 0);
    }

    #[test]
    fn test_unwhitelisted_recipient_allowed_when_policy_relaxed() {
        let policy = PolicyConfig {
            require_recipient_whitelisted: false,
            ..PolicyConfig::default()
        };
        let reg = ComplianceRegistry::with_policy(addr(0xAA), AUTH, &policy);
        enroll(&reg, addr(0x10), 0, DAY_START + 1_000);
        assert!(reg.execute_transfer(&addr(0x10), &addr(0x12), 5, ts(DAY_START)).is_ok());
        reg.add_to_blacklist(&AUTH, addr(0x12), "sanctions", ts(DAY_START)).unwrap();
        assert!(reg.execute_transfer(&addr(0x10), &addr(0x12), 5, ts(DAY_START)).is_err());
    }

    #[test]
    fn test_transfer_jurisdiction_screening() {
        let policy = PolicyConfig {
            restricted_transfer_jurisdictions: vec![Jurisdiction::Singapore],
            ..PolicyConfig::default()
        };
        let reg = ComplianceRegistry::with_policy(addr(0xAA), AUTH, &policy);
        enroll(&reg, addr(0x10), 0, DAY_START + 1_000);
        enroll(&reg, addr(0x11), 0, DAY_START + 1_000);
        // The check follows the four-step order only.
        assert!(reg.check_transfer_eligible(&addr(0x10), 5, ts(DAY_START)).is_eligible());
        let err = reg.execute_transfer(&addr(0x10), &addr(0x11), 5, ts(DAY_START)).unwrap_err();
        assert_eq!(
            err,
            ComplianceError::JurisdictionNotAllowed {
                jurisdiction: Jurisdiction::Singapore,
                operation: "transfer"
            }
        );
    }

    #[test]
    fn test_inactive_registry_denies_everything() {
        let reg = registry();
        enroll(&reg, addr(0x10), 0, DAY_START + 1_000);
        enroll(&reg, addr(0x11), 0, DAY_START + 1_000);
        reg.set_active(&AUTH, false).unwrap();
        assert_eq!(
            reg.check_transfer_eligible(&addr(0x10), 1, ts(DAY_START)),
            Eligibility::Denied(DenialReason::RegistryInactive)
        );
        assert_eq!(
            reg.execute_transfer(&addr(0x10), &addr(0x11), 1, ts(DAY_START)),
            Err(ComplianceError::RegistryInactive)
        );
    }

    #[test]
    fn test_concurrent_transfers_never_exceed_limit() {
        use std::sync::Arc;

        let reg = Arc::new(registry());
        enroll(&reg, addr(0x10), 1_000, DAY_START + 1_000);
        enroll(&reg, addr(0x11), 0, DAY_START + 1_000);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| {
                            reg.execute_transfer(&addr(0x10), &addr(0x11), 7, ts(DAY_START)).is_ok()
                        })
                        .count()
                })
            })
            .collect();
        let committed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(committed, 1_000 / 7);
        assert_eq!(
            reg.whitelist_entry(&addr(0x10)).unwrap().counter.volume,
            (1_000 / 7) * 7
        );
    }

    #[test]
    fn test_denial_reason_serializes_tagged() {
        let json = serde_json::to_value(Eligibility::Denied(DenialReason::Blacklisted)).unwrap();
        assert_eq!(json["status"], "denied");
    }
}
