//! Timestamp type used throughout the workspace.
//!
//! Timestamps are Unix epoch seconds (UTC). Remote services report times in
//! epoch milliseconds; use [`Timestamp::from_millis`] at the wire boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Build a timestamp from epoch milliseconds, truncating to whole seconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis / 1000)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        Self(now_millis() / 1000)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> u64 {
        self.0.saturating_mul(1000)
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// A clock set before 1970 reads as zero rather than panicking.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
