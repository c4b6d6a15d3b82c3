//! Configuration for the verification integration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use attest_types::NetworkId;

use crate::error::CheckerError;

/// Connection settings for one validator network endpoint.
///
/// `baseUrl` is the only required key; everything else has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfig {
    /// Bearer token sent with every request, if set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Root URL of the validator network API, e.g. `https://api.checker.network/v1`.
    pub base_url: String,

    /// Which network submitted claims are routed to.
    #[serde(default)]
    pub network: NetworkId,

    /// Per-HTTP-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Polling cadence for pending verifications.
    #[serde(default)]
    pub poll: PollConfig,
}

/// How the poller spaces out fetches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollConfig {
    /// Base delay between fetches, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on fetch calls per verification.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub backoff: Backoff,
}

/// Delay growth between consecutive fetches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Backoff {
    /// Same interval every time.
    #[default]
    Fixed,
    /// `interval * factor^(attempt - 1)`, capped at `max_interval_ms`.
    Exponential {
        factor: f64,
        #[serde(rename = "maxIntervalMs")]
        max_interval_ms: u64,
    },
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_max_attempts() -> u32 {
    30
}

// ── Impl ───────────────────────────────────────────────────────────────

impl VerificationConfig {
    pub fn new(base_url: impl Into<String>, network: NetworkId) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            network,
            request_timeout_secs: default_request_timeout_secs(),
            poll: PollConfig::default(),
        }
    }

    /// Check the fields serde cannot: non-empty URL, usable poll bounds.
    pub fn validate(&self) -> Result<(), CheckerError> {
        if self.base_url.trim().is_empty() {
            return Err(CheckerError::Config("baseUrl must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CheckerError::Config(
                "requestTimeoutSecs must be greater than zero".into(),
            ));
        }
        self.poll.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), CheckerError> {
        if self.max_attempts == 0 {
            return Err(CheckerError::Config("poll.maxAttempts must be at least 1".into()));
        }
        if let Backoff::Exponential { factor, .. } = self.backoff {
            if factor.is_nan() || factor < 1.0 {
                return Err(CheckerError::Config(format!(
                    "poll.backoff.factor must be >= 1, got {factor}"
                )));
            }
        }
        Ok(())
    }

    /// Delay after the `attempt`-th fetch (1-based) came back pending.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let base = Duration::from_millis(self.interval_ms);
        match self.backoff {
            Backoff::Fixed => base,
            Backoff::Exponential {
                factor,
                max_interval_ms,
            } => {
                let exp = attempt.saturating_sub(1).min(64) as i32;
                let millis = (self.interval_ms as f64) * factor.powi(exp);
                let capped = millis.min(max_interval_ms as f64).max(0.0);
                Duration::from_millis(capped as u64)
            }
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
            backoff: Backoff::Fixed,
        }
    }
}
