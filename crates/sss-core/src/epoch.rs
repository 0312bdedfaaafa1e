//! # Daily-Epoch Bookkeeping
//!
//! Whitelist entries and issuers both carry a volume counter that resets at
//! the start of each UTC day. Rollover is evaluated lazily at the point of
//! use: read the stored epoch, reset if it is stale, check the limit, then
//! increment.
//!
//! ## Atomicity
//!
//! [`DailyCounter::commit`] performs reset, check and increment on `&mut self`
//! in one call and writes nothing on rejection. Callers hold the record's
//! exclusive lock across the call, so two requests that both observe a stale
//! epoch cannot both reset and proceed.

use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// A volume counter scoped to one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounter {
    /// UTC day (days since the Unix epoch) the volume belongs to.
    pub epoch_day: i64,
    /// Volume accumulated during `epoch_day`.
    pub volume: u64,
}

/// The limit check failed; carries the figures for the caller's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitExceeded {
    /// Volume in the current epoch before the attempted amount.
    pub volume: u64,
    /// Attempted amount.
    pub amount: u64,
    /// Configured limit.
    pub limit: u64,
}

impl DailyCounter {
    /// A fresh counter with zero volume, starting in the epoch of `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            epoch_day: now.epoch_day(),
            volume: 0,
        }
    }

    /// Whether the stored epoch differs from the epoch of `now`.
    pub fn is_stale(&self, now: Timestamp) -> bool {
        self.epoch_day != now.epoch_day()
    }

    /// Volume that counts against the limit at `now` (zero if stale).
    pub fn volume_at(&self, now: Timestamp) -> u64 {
        if self.is_stale(now) {
            0
        } else {
            self.volume
        }
    }

    /// Check whether `amount` fits under `limit` at `now` without mutating.
    ///
    /// `limit == 0` means unlimited. Overflowing `volume + amount` is treated
    /// as exceeding any non-zero limit.
    pub fn check(&self, amount: u64, limit: u64, now: Timestamp) -> Result<(), LimitExceeded> {
        if limit == 0 {
            return Ok(());
        }
        let volume = self.volume_at(now);
        match volume.checked_add(amount) {
            Some(total) if total <= limit => Ok(()),
            _ => Err(LimitExceeded {
                volume,
                amount,
                limit,
            }),
        }
    }

    /// Reset if stale, check, and increment as one step.
    ///
    /// Returns the post-increment volume. On rejection the counter is left
    /// exactly as it was, including a stale epoch marker.
    pub fn commit(&mut self, amount: u64, limit: u64, now: Timestamp) -> Result<u64, LimitExceeded> {
        self.check(amount, limit, now)?;
        let base = self.volume_at(now);
        // Unlimited counters saturate rather than fail.
        self.volume = base.saturating_add(amount);
        self.epoch_day = now.epoch_day();
        Ok(self.volume)
    }
}
