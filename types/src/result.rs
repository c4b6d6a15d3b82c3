//! Verification results and validator-network health.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Timestamp, TypesError};

/// Lifecycle status of a verification as reported by the validator network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Validators are still voting.
    Pending,
    /// Consensus reached in favour of the claim.
    Verified,
    /// Consensus reached against the claim.
    Rejected,
    /// The network gave up before reaching consensus.
    Timeout,
}

impl VerificationStatus {
    /// Whether polling past this status is meaningless.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            "timeout" => Ok(Self::Timeout),
            other => Err(TypesError::UnknownStatus(other.to_string())),
        }
    }
}

/// One validator's individual verdict on a claim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub validator: String,
    pub verdict: VerificationStatus,
    pub confidence: f64,
}

/// A snapshot of a verification as reported by the network.
///
/// Once a terminal snapshot is returned to a caller it is owned solely by
/// that caller; nothing in the workspace holds on to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Identifier assigned by the network at submission time.
    pub id: String,
    pub status: VerificationStatus,
    /// Aggregate confidence in `[0, 1]`; meaningful only in terminal states.
    pub confidence: f64,
    /// Number of validators that took part.
    pub validator_count: u32,
    /// Observed fraction of agreeing validators.
    pub consensus_ratio: f64,
    /// Per-validator sub-results, in the order the network reported them.
    pub evidence: Vec<EvidenceEntry>,
    /// Fee charged for the verification.
    pub cost: f64,
    /// When this snapshot was produced (not when verification started).
    pub timestamp: Timestamp,
}

impl VerificationResult {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Health of the validator pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub active_validators: u32,
    pub total_validators: u32,
    pub average_response_time_ms: u64,
    /// Current load in `[0, 1]`.
    pub network_load: f64,
    /// Rolling fraction of verifications that reached consensus, in `[0, 1]`.
    pub consensus_rate: f64,
    pub last_update: Timestamp,
}
