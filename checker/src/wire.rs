//! Wire-level JSON shapes exchanged with the validator network.
//!
//! Upstream responses are loosely typed, so decoding happens in two steps:
//! serde into the `Raw*` structs below, then validation into the shared
//! types from `attest-types`.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use attest_types::{
    EvidenceEntry, NetworkId, NetworkStatus, Timestamp, VerificationRequest, VerificationResult,
    VerificationStatus,
};

use crate::error::CheckerError;

/// Body of `POST /verify`.
#[derive(Debug, Serialize)]
pub(crate) struct SubmitBody<'a> {
    #[serde(flatten)]
    pub request: &'a VerificationRequest,
    pub network: NetworkId,
}

/// Response of `POST /verify`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitResponse {
    #[serde(alias = "id")]
    pub verification_id: String,
}

/// `status` may be a single string or, from some relays, a list of signals.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawStatus {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEvidence {
    pub validator: String,
    #[serde(alias = "verdict")]
    pub result: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Response of `GET /verify/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawResult {
    pub id: String,
    pub status: RawStatus,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub rejected: Option<bool>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, alias = "validatorCount")]
    pub validators: u32,
    #[serde(default, alias = "consensusRatio")]
    pub consensus: f64,
    #[serde(default)]
    pub evidence: Vec<RawEvidence>,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default)]
    pub cost: f64,
}

/// Response of `GET /network/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNetworkStatus {
    pub active_validators: u32,
    pub total_validators: u32,
    #[serde(alias = "averageResponseTime")]
    pub average_response_time_ms: u64,
    #[serde(default)]
    pub network_load: f64,
    #[serde(default)]
    pub consensus_rate: f64,
    #[serde(default)]
    pub last_update: Option<RawTimestamp>,
}

/// A point in time as relays send it: epoch milliseconds (integer or
/// fractional) or an RFC 3339 string. Anything else decodes as `Other` so a
/// bad timestamp never discards the verdict it is attached to.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTimestamp {
    Millis(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl RawTimestamp {
    pub fn to_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Millis(ms) if ms.is_finite() && *ms >= 0.0 => {
                Some(Timestamp::from_millis(*ms as u64))
            }
            Self::Text(text) => {
                let text = text.trim();
                if let Ok(ms) = text.parse::<u64>() {
                    return Some(Timestamp::from_millis(ms));
                }
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .and_then(|dt| u64::try_from(dt.timestamp_millis()).ok())
                    .map(Timestamp::from_millis)
            }
            _ => None,
        }
    }
}

/// Decoded timestamp, or the local clock when it is absent or unreadable.
fn timestamp_or_now(raw: Option<&RawTimestamp>) -> Timestamp {
    match raw {
        None => Timestamp::now(),
        Some(raw) => raw.to_timestamp().unwrap_or_else(|| {
            tracing::debug!("unreadable timestamp {raw:?}, using local clock");
            Timestamp::now()
        }),
    }
}

/// Response of `GET /verify/history/{subject}`: either a cursor page or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawHistory {
    Page {
        items: Vec<RawResult>,
        #[serde(default)]
        cursor: Option<String>,
    },
    List(Vec<RawResult>),
}

/// Collapse every status signal in a response into one status.
///
/// Any rejection signal wins over a verification signal, so a malformed
/// response that claims both is treated as rejected. An empty signal set is
/// an error rather than an implicit `pending`.
pub fn resolve_status(signals: &[VerificationStatus]) -> Option<VerificationStatus> {
    use VerificationStatus::*;
    [Rejected, Verified, Timeout, Pending]
        .into_iter()
        .find(|candidate| signals.contains(candidate))
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn parse_status(raw: &str) -> Result<VerificationStatus, CheckerError> {
    raw.parse()
        .map_err(|e| CheckerError::InvalidResponse(format!("{e}")))
}

impl RawResult {
    pub fn into_result(self) -> Result<VerificationResult, CheckerError> {
        let mut signals = match &self.status {
            RawStatus::One(s) => vec![parse_status(s)?],
            RawStatus::Many(list) => list
                .iter()
                .map(|s| parse_status(s))
                .collect::<Result<Vec<_>, _>>()?,
        };
        if self.verified == Some(true) {
            signals.push(VerificationStatus::Verified);
        }
        if self.rejected == Some(true) {
            signals.push(VerificationStatus::Rejected);
        }
        let status = resolve_status(&signals).ok_or_else(|| {
            CheckerError::InvalidResponse(format!("verification {} carries no status", self.id))
        })?;

        let evidence = self
            .evidence
            .into_iter()
            .map(|e| {
                Ok(EvidenceEntry {
                    validator: e.validator,
                    verdict: parse_status(&e.result)?,
                    confidence: clamp_unit(e.confidence),
                })
            })
            .collect::<Result<Vec<_>, CheckerError>>()?;

        Ok(VerificationResult {
            id: self.id,
            status,
            confidence: clamp_unit(self.confidence),
            validator_count: self.validators,
            consensus_ratio: clamp_unit(self.consensus),
            evidence,
            cost: self.cost.max(0.0),
            timestamp: timestamp_or_now(self.timestamp.as_ref()),
        })
    }
}

impl From<RawNetworkStatus> for NetworkStatus {
    fn from(raw: RawNetworkStatus) -> Self {
        Self {
            active_validators: raw.active_validators,
            total_validators: raw.total_validators,
            average_response_time_ms: raw.average_response_time_ms,
            network_load: clamp_unit(raw.network_load),
            consensus_rate: clamp_unit(raw.consensus_rate),
            last_update: timestamp_or_now(raw.last_update.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<VerificationResult, CheckerError> {
        serde_json::from_str::<RawResult>(json).unwrap().into_result()
    }

    #[test]
    fn decodes_full_result() {
        let result = decode(
            r#"{
                "id": "v-1", "status": "verified", "confidence": 0.92,
                "validators": 5, "consensus": 0.9,
                "evidence": [
                    {"validator": "validator_1", "result": "verified", "confidence": 0.9},
                    {"validator": "validator_2", "result": "rejected", "confidence": 0.4}
                ],
                "timestamp": 1700000000123, "cost": 0.1
            }"#,
        )
        .unwrap();
        assert_eq!(result.status, VerificationStatus::Verified);
        assert_eq!(result.validator_count, 5);
        assert_eq!(result.evidence.len(), 2);
        assert_eq!(result.evidence[1].verdict, VerificationStatus::Rejected);
        assert_eq!(result.timestamp, Timestamp::new(1_700_000_000));
    }

    #[test]
    fn conflicting_status_list_resolves_to_rejected() {
        let result = decode(r#"{"id": "v-2", "status": ["verified", "rejected"]}"#).unwrap();
        assert_eq!(result.status, VerificationStatus::Rejected);
    }

    #[test]
    fn rejected_flag_overrides_verified_status() {
        let result = decode(r#"{"id": "v-3", "status": "verified", "rejected": true}"#).unwrap();
        assert_eq!(result.status, VerificationStatus::Rejected);
    }

    #[test]
    fn unknown_status_is_invalid_response() {
        let err = decode(r#"{"id": "v-4", "status": "maybe"}"#).unwrap_err();
        assert!(matches!(err, CheckerError::InvalidResponse(_)));
    }

    #[test]
    fn empty_status_list_is_invalid_response() {
        let err = decode(r#"{"id": "v-5", "status": []}"#).unwrap_err();
        assert!(matches!(err, CheckerError::InvalidResponse(_)));
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let result = decode(r#"{"id": "v-6", "status": "verified", "confidence": 1.7}"#).unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn rfc3339_timestamp_keeps_the_verdict() {
        let result =
            decode(r#"{"id": "v-7", "status": "verified", "timestamp": "2024-01-01T00:00:00.000Z"}"#)
                .unwrap();
        assert_eq!(result.status, VerificationStatus::Verified);
        assert_eq!(result.timestamp, Timestamp::new(1_704_067_200));
    }

    #[test]
    fn fractional_millis_timestamp_is_accepted() {
        let result =
            decode(r#"{"id": "v-8", "status": "rejected", "timestamp": 1700000000123.0}"#).unwrap();
        assert_eq!(result.status, VerificationStatus::Rejected);
        assert_eq!(result.timestamp, Timestamp::new(1_700_000_000));
    }

    #[test]
    fn unreadable_timestamp_falls_back_to_local_clock() {
        let before = Timestamp::now();
        let result =
            decode(r#"{"id": "v-9", "status": "verified", "timestamp": "yesterday"}"#).unwrap();
        assert_eq!(result.status, VerificationStatus::Verified);
        assert!(result.timestamp >= before);

        let result = decode(r#"{"id": "v-10", "status": "verified", "timestamp": true}"#).unwrap();
        assert!(result.timestamp >= before);
    }

    #[test]
    fn history_accepts_list_and_page_shapes() {
        let list: RawHistory = serde_json::from_str(r#"[{"id": "a", "status": "verified"}]"#).unwrap();
        assert!(matches!(list, RawHistory::List(ref items) if items.len() == 1));

        let page: RawHistory = serde_json::from_str(
            r#"{"items": [{"id": "a", "status": "rejected"}], "cursor": "MTA="}"#,
        )
        .unwrap();
        assert!(matches!(page, RawHistory::Page { cursor: Some(_), .. }));
    }

    #[test]
    fn network_status_accepts_legacy_latency_name() {
        let raw: RawNetworkStatus = serde_json::from_str(
            r#"{"activeValidators": 150, "totalValidators": 200,
                "averageResponseTime": 2500, "networkLoad": 0.65,
                "consensusRate": 0.92, "lastUpdate": 1700000000000}"#,
        )
        .unwrap();
        let status = NetworkStatus::from(raw);
        assert_eq!(status.average_response_time_ms, 2500);
        assert_eq!(status.active_validators, 150);
        assert_eq!(status.last_update, Timestamp::new(1_700_000_000));
    }

    #[test]
    fn network_status_accepts_rfc3339_last_update() {
        let raw: RawNetworkStatus = serde_json::from_str(
            r#"{"activeValidators": 3, "totalValidators": 4,
                "averageResponseTimeMs": 100,
                "lastUpdate": "2024-01-01T00:00:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(NetworkStatus::from(raw).last_update, Timestamp::new(1_704_067_200));
    }
}
