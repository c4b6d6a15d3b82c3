//! Verification requests: one claim submitted to the validator network.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ConsensusRequirements, TypesError};

/// The category of claim being verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Identity,
    Transaction,
    Data,
    Location,
    Custom,
}

impl VerificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Transaction => "transaction",
            Self::Data => "data",
            Self::Location => "location",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Self::Identity),
            "transaction" => Ok(Self::Transaction),
            "data" => Ok(Self::Data),
            "location" => Ok(Self::Location),
            "custom" => Ok(Self::Custom),
            other => Err(TypesError::UnknownKind(other.to_string())),
        }
    }
}

/// A claim plus the consensus it needs.
///
/// Created per call and never reused. The kind is fixed at construction, and
/// the requirements were validated when they were built, so a request that
/// exists is always submittable.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationRequest {
    kind: VerificationKind,
    payload: serde_json::Value,
    requirements: ConsensusRequirements,
}

impl VerificationRequest {
    pub fn new(
        kind: VerificationKind,
        payload: serde_json::Value,
        requirements: ConsensusRequirements,
    ) -> Self {
        Self {
            kind,
            payload,
            requirements,
        }
    }

    pub fn kind(&self) -> VerificationKind {
        self.kind
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn requirements(&self) -> &ConsensusRequirements {
        &self.requirements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn serializes_submit_body_fields() {
        let req = VerificationRequest::new(
            VerificationKind::Identity,
            serde_json::json!({ "agentId": "agent-42" }),
            ConsensusRequirements::new(3, 0.8, Duration::from_secs(30)).unwrap(),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["kind"], "identity");
        assert_eq!(json["payload"]["agentId"], "agent-42");
        assert_eq!(json["requirements"]["minValidators"], 3);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            VerificationKind::Identity,
            VerificationKind::Transaction,
            VerificationKind::Data,
            VerificationKind::Location,
            VerificationKind::Custom,
        ] {
            assert_eq!(kind.as_str().parse::<VerificationKind>().unwrap(), kind);
        }
    }
}
