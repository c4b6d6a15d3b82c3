//! Consensus requirements attached to every verification request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::TypesError;

/// How much validator agreement a claim needs, and how long to wait for it.
///
/// Invariants, enforced by [`ConsensusRequirements::new`] and on deserialization:
/// - `min_validators >= 1`
/// - `consensus_threshold` in `(0, 1]`
/// - `timeout > 0`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRequirements", into = "WireRequirements")]
pub struct ConsensusRequirements {
    min_validators: u32,
    consensus_threshold: f64,
    timeout: Duration,
}

/// Wire form: `{minValidators, consensusThreshold, timeoutMs}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequirements {
    min_validators: u32,
    consensus_threshold: f64,
    timeout_ms: u64,
}

impl ConsensusRequirements {
    pub fn new(
        min_validators: u32,
        consensus_threshold: f64,
        timeout: Duration,
    ) -> Result<Self, TypesError> {
        if min_validators == 0 {
            return Err(TypesError::InvalidRequirements(
                "minValidators must be at least 1".into(),
            ));
        }
        // Written so that NaN fails the check.
        if !(consensus_threshold > 0.0 && consensus_threshold <= 1.0) {
            return Err(TypesError::InvalidRequirements(format!(
                "consensusThreshold must be in (0, 1], got {consensus_threshold}"
            )));
        }
        if timeout.is_zero() {
            return Err(TypesError::InvalidRequirements(
                "timeout must be greater than zero".into(),
            ));
        }
        Ok(Self {
            min_validators,
            consensus_threshold,
            timeout,
        })
    }

    pub fn min_validators(&self) -> u32 {
        self.min_validators
    }

    pub fn consensus_threshold(&self) -> f64 {
        self.consensus_threshold
    }

    /// Wall-clock deadline for the whole polling phase.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl TryFrom<WireRequirements> for ConsensusRequirements {
    type Error = TypesError;

    fn try_from(raw: WireRequirements) -> Result<Self, Self::Error> {
        Self::new(
            raw.min_validators,
            raw.consensus_threshold,
            Duration::from_millis(raw.timeout_ms),
        )
    }
}

impl From<ConsensusRequirements> for WireRequirements {
    fn from(req: ConsensusRequirements) -> Self {
        Self {
            min_validators: req.min_validators,
            consensus_threshold: req.consensus_threshold,
            // Round up so a sub-millisecond timeout never goes out as 0.
            timeout_ms: u64::try_from(req.timeout.as_nanos().div_ceil(1_000_000))
                .unwrap_or(u64::MAX),
        }
    }
}
