//! # Temporal Types — UTC Timestamps, Epochs and Clocks
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds, the UTC-day
//! epoch used for daily-limit bookkeeping, and the [`Clock`] trait through
//! which the control plane reads "now".
//!
//! ## Security Invariant
//!
//! Decision functions never read the wall clock. The current time is supplied
//! by a [`Clock`] owned by the caller, so every rejection is reproducible from
//! its inputs and tests can pin time exactly.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Seconds in one UTC day; the length of a daily-limit epoch.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string with a `Z` suffix.
    ///
    /// Offsets other than `Z` (including `+00:00`) are rejected.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        if !s.ends_with('Z') {
            return Err(ConfigError::Invalid(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ConfigError::Invalid(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from Unix seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ConfigError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| ConfigError::Invalid(format!("invalid Unix timestamp: {secs}")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// The UTC day this instant falls in (days since 1970-01-01).
    ///
    /// Two instants share a daily-limit epoch iff their `epoch_day` is equal.
    pub fn epoch_day(&self) -> i64 {
        self.epoch_secs().div_euclid(SECONDS_PER_DAY)
    }

    /// This timestamp shifted by `secs` seconds, saturating at the
    /// representable range.
    pub fn plus_secs(&self, secs: i64) -> Self {
        let bound = if secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        let shifted = chrono::TimeDelta::try_seconds(secs)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .unwrap_or(bound);
        Self(truncate_to_seconds(shifted))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl Default for Timestamp {
    /// The Unix epoch.
    fn default() -> Self {
        Self(DateTime::<Utc>::default())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ─── Clocks ──────────────────────────────────────────────────────────

/// Source of the current time, supplied by the execution environment.
pub trait Clock: Send + Sync {
    /// The current UTC time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock pinned to an explicit instant, advanced manually.
///
/// Shared by reference between the caller and the control plane; interior
/// mutability lets tests move time without rebuilding the handle.
#[derive(Debug, Default)]
pub struct FixedClock {
    secs: AtomicI64,
}

impl FixedClock {
    /// Pin the clock at `ts`.
    pub fn at(ts: Timestamp) -> Self {
        Self {
            secs: AtomicI64::new(ts.epoch_secs()),
        }
    }

    /// Pin the clock at Unix second `secs`.
    pub fn at_secs(secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(secs),
        }
    }

    /// Move the clock to `ts`.
    pub fn set(&self, ts: Timestamp) {
        self.secs.store(ts.epoch_secs(), Ordering::SeqCst);
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_epoch_secs(self.secs.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
