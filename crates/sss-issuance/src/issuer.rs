//! # Issuers
//!
//! An issuer is an authority allowed to mint and burn against its own daily
//! ceilings. Mint and burn volumes are tracked independently, each with the
//! shared UTC-day counter from `sss-core`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sss_core::{Address, DailyCounter, IssuanceError, Timestamp};

/// Namespace tag for issuer record addresses.
pub const ISSUER_NAMESPACE: &[u8] = b"issuer";

/// Kind of institution behind an issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuerType {
    TrustBank,
    Distributor,
    Exchange,
    ApiPartner,
}

impl IssuerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrustBank => "trust_bank",
            Self::Distributor => "distributor",
            Self::Exchange => "exchange",
            Self::ApiPartner => "api_partner",
        }
    }
}

impl std::fmt::Display for IssuerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssuerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "trust_bank" => Ok(Self::TrustBank),
            "distributor" => Ok(Self::Distributor),
            "exchange" => Ok(Self::Exchange),
            "api_partner" => Ok(Self::ApiPartner),
            other => Err(format!("unknown issuer type: {other:?}")),
        }
    }
}

/// An issuer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub authority: Address,
    pub issuer_type: IssuerType,
    /// 0 means unlimited.
    pub daily_mint_limit: u64,
    /// 0 means unlimited.
    pub daily_burn_limit: u64,
    pub mint_counter: DailyCounter,
    pub burn_counter: DailyCounter,
    pub total_minted: u64,
    pub total_burned: u64,
    pub is_active: bool,
    pub registered_at: Timestamp,
}

/// Partial issuer update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerUpdate {
    pub daily_mint_limit: Option<u64>,
    pub daily_burn_limit: Option<u64>,
    pub is_active: Option<bool>,
}

impl Issuer {
    pub fn new(
        authority: Address,
        issuer_type: IssuerType,
        daily_mint_limit: u64,
        daily_burn_limit: u64,
        now: Timestamp,
    ) -> Self {
        Self {
            authority,
            issuer_type,
            daily_mint_limit,
            daily_burn_limit,
            mint_counter: DailyCounter::new(now),
            burn_counter: DailyCounter::new(now),
            total_minted: 0,
            total_burned: 0,
            is_active: true,
            registered_at: now,
        }
    }

    pub fn apply(&mut self, update: IssuerUpdate) {
        if let Some(limit) = update.daily_mint_limit {
            self.daily_mint_limit = limit;
        }
        if let Some(limit) = update.daily_burn_limit {
            self.daily_burn_limit = limit;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
    }

    pub(crate) fn require_active(&self) -> Result<(), IssuanceError> {
        if self.is_active {
            Ok(())
        } else {
            Err(IssuanceError::IssuerInactive(self.authority.to_hex()))
        }
    }

    /// Check the mint ceiling without recording anything.
    pub fn check_mint(&self, amount: u64, now: Timestamp) -> Result<(), IssuanceError> {
        self.mint_counter
            .check(amount, self.daily_mint_limit, now)
            .map_err(|e| IssuanceError::DailyLimitExceeded {
                operation: "mint",
                volume: e.volume,
                amount: e.amount,
                limit: e.limit,
            })
    }

    /// Check the burn ceiling without recording anything.
    pub fn check_burn(&self, amount: u64, now: Timestamp) -> Result<(), IssuanceError> {
        self.burn_counter
            .check(amount, self.daily_burn_limit, now)
            .map_err(|e| IssuanceError::DailyLimitExceeded {
                operation: "burn",
                volume: e.volume,
                amount: e.amount,
                limit: e.limit,
            })
    }

    pub(crate) fn record_mint(&mut self, amount: u64, now: Timestamp) -> Result<u64, IssuanceError> {
        let volume = self
            .mint_counter
            .commit(amount, self.daily_mint_limit, now)
            .map_err(|e| IssuanceError::DailyLimitExceeded {
                operation: "mint",
                volume: e.volume,
                amount: e.amount,
                limit: e.limit,
            })?;
        self.total_minted = self.total_minted.saturating_add(amount);
        Ok(volume)
    }

    pub(crate) fn record_burn(&mut self, amount: u64, now: Timestamp) -> Result<u64, IssuanceError> {
        let volume = self
            .burn_counter
            .commit(amount, self.daily_burn_limit, now)
            .map_err(|e| IssuanceError::DailyLimitExceeded {
                operation: "burn",
                volume: e.volume,
                amount: e.amount,
                limit: e.limit,
            })?;
        self.total_burned = self.total_burned.saturating_add(amount);
        Ok(volume)
    }
}
