//! Typed verification operations with risk-tuned consensus requirements.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use attest_types::{
    time::now_millis, ConsensusRequirements, NetworkStatus, VerificationKind,
    VerificationRequest, VerificationResult,
};

use crate::cancel::CancelToken;
use crate::client::{HttpVerificationClient, VerificationClient, DEFAULT_HISTORY_PAGE_SIZE};
use crate::config::{PollConfig, VerificationConfig};
use crate::error::CheckerError;
use crate::history::{history_stream, HistoryStream};
use crate::metrics::CheckerMetrics;
use crate::poller::ConsensusPoller;

/// Consensus requirements for one class of claim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskTier {
    pub min_validators: u32,
    pub consensus_threshold: f64,
    pub timeout: Duration,
}

impl RiskTier {
    pub fn requirements(&self) -> Result<ConsensusRequirements, CheckerError> {
        Ok(ConsensusRequirements::new(
            self.min_validators,
            self.consensus_threshold,
            self.timeout,
        )?)
    }
}

pub const IDENTITY_TIER: RiskTier = RiskTier {
    min_validators: 3,
    consensus_threshold: 0.8,
    timeout: Duration::from_secs(30),
};

pub const TRANSACTION_TIER: RiskTier = RiskTier {
    min_validators: 5,
    consensus_threshold: 0.9,
    timeout: Duration::from_secs(60),
};

pub const LOCATION_TIER: RiskTier = RiskTier {
    min_validators: 3,
    consensus_threshold: 0.75,
    timeout: Duration::from_secs(45),
};

/// Domain-level entry point to the validator network.
///
/// Business outcomes come back as the `status` of an `Ok` result; `Err` is
/// reserved for infrastructure failures.
#[derive(Clone)]
pub struct VerificationService {
    client: Arc<dyn VerificationClient>,
    poller: ConsensusPoller,
    history_page_size: u32,
}

impl VerificationService {
    pub fn new(client: Arc<dyn VerificationClient>, poll: PollConfig) -> Self {
        let poller = ConsensusPoller::new(client.clone(), poll);
        Self {
            client,
            poller,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }

    /// Build a service backed by [`HttpVerificationClient`].
    pub fn from_config(config: &VerificationConfig) -> Result<Self, CheckerError> {
        let client = HttpVerificationClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.poll.clone()))
    }

    pub fn with_metrics(mut self, metrics: Arc<CheckerMetrics>) -> Self {
        self.poller = self.poller.with_metrics(metrics);
        self
    }

    pub fn with_history_page_size(mut self, page_size: u32) -> Self {
        self.history_page_size = page_size.max(1);
        self
    }

    pub fn poller(&self) -> &ConsensusPoller {
        &self.poller
    }

    /// Verify an arbitrary claim with caller-chosen requirements.
    pub async fn verify(
        &self,
        kind: VerificationKind,
        payload: serde_json::Value,
        requirements: ConsensusRequirements,
        cancel: &CancelToken,
    ) -> Result<VerificationResult, CheckerError> {
        let request = VerificationRequest::new(kind, payload, requirements);
        self.poller.run(&request, cancel).await
    }

    /// Verify that `subject_id` holds the given credentials.
    pub async fn verify_identity(
        &self,
        subject_id: &str,
        credentials: serde_json::Value,
        cancel: &CancelToken,
    ) -> Result<VerificationResult, CheckerError> {
        require_non_empty("subject id", subject_id)?;
        let payload = json!({
            "agentId": subject_id,
            "credentials": credentials,
            "timestamp": now_millis(),
        });
        self.verify(
            VerificationKind::Identity,
            payload,
            IDENTITY_TIER.requirements()?,
            cancel,
        )
        .await
    }

    /// Verify that transaction `tx_ref` exists and is authentic on `chain`.
    pub async fn verify_transaction(
        &self,
        tx_ref: &str,
        chain: &str,
        cancel: &CancelToken,
    ) -> Result<VerificationResult, CheckerError> {
        require_non_empty("transaction reference", tx_ref)?;
        require_non_empty("chain", chain)?;
        let payload = json!({
            "txHash": tx_ref,
            "chain": chain,
            "timestamp": now_millis(),
        });
        self.verify(
            VerificationKind::Transaction,
            payload,
            TRANSACTION_TIER.requirements()?,
            cancel,
        )
        .await
    }

    /// Verify a claimed position, backed by caller-supplied evidence.
    pub async fn verify_location(
        &self,
        latitude: f64,
        longitude: f64,
        evidence: Vec<serde_json::Value>,
        cancel: &CancelToken,
    ) -> Result<VerificationResult, CheckerError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CheckerError::InvalidRequest(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CheckerError::InvalidRequest(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        let payload = json!({
            "coordinates": { "latitude": latitude, "longitude": longitude },
            "evidence": evidence,
            "timestamp": now_millis(),
        });
        self.verify(
            VerificationKind::Location,
            payload,
            LOCATION_TIER.requirements()?,
            cancel,
        )
        .await
    }

    /// Current validator pool health. No retries.
    pub async fn network_status(&self) -> Result<NetworkStatus, CheckerError> {
        self.client.network_status().await
    }

    /// Past results for `subject_id`, fetched lazily. See [`HistoryStream`] for ordering.
    ///
    /// Each call starts from the first page.
    pub fn history(&self, subject_id: &str) -> HistoryStream {
        history_stream(
            self.client.clone(),
            subject_id.to_string(),
            self.history_page_size,
        )
    }
}

fn require_non_empty(what: &str, value: &str) -> Result<(), CheckerError> {
    if value.trim().is_empty() {
        return Err(CheckerError::InvalidRequest(format!("{what} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_tiers_produce_valid_requirements() {
        for tier in [IDENTITY_TIER, TRANSACTION_TIER, LOCATION_TIER] {
            let req = tier.requirements().unwrap();
            assert_eq!(req.min_validators(), tier.min_validators);
            assert_eq!(req.timeout(), tier.timeout);
        }
    }

    #[test]
    fn transaction_tier_is_strictest() {
        assert!(TRANSACTION_TIER.min_validators > IDENTITY_TIER.min_validators);
        assert!(TRANSACTION_TIER.consensus_threshold > IDENTITY_TIER.consensus_threshold);
        assert!(LOCATION_TIER.consensus_threshold < IDENTITY_TIER.consensus_threshold);
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_non_empty("subject id", "   ").is_err());
        assert!(require_non_empty("subject id", "agent-42").is_ok());
    }
}
