//! Submit → poll → decide, for a single verification request.
//!
//! The poller owns the retry policy for the whole protocol:
//! - a failed submission fails fast with [`CheckerError::Submission`];
//! - fetches are strictly sequential, and the first terminal status wins;
//! - transport failures and undecodable responses while polling are
//!   transient: logged, counted, and retried at the next interval;
//! - `NotFound` is permanent and returned immediately;
//! - running out of attempts or reaching `requirements.timeout` while still
//!   pending yields [`CheckerError::Timeout`], whatever mix of pending and
//!   transient failures led there.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use attest_types::{VerificationRequest, VerificationResult};

use crate::cancel::CancelToken;
use crate::client::VerificationClient;
use crate::config::PollConfig;
use crate::error::CheckerError;
use crate::metrics::CheckerMetrics;

/// Stand-in deadline for timeouts too large to add to an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Drives one verification request to a terminal result.
///
/// Holds no per-request state, so one poller can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct ConsensusPoller {
    client: Arc<dyn VerificationClient>,
    config: PollConfig,
    metrics: Option<Arc<CheckerMetrics>>,
}

impl ConsensusPoller {
    pub fn new(client: Arc<dyn VerificationClient>, config: PollConfig) -> Self {
        Self {
            client,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<CheckerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Submit `request` and poll until a terminal result, the deadline, or
    /// cancellation.
    pub async fn run(
        &self,
        request: &VerificationRequest,
        cancel: &CancelToken,
    ) -> Result<VerificationResult, CheckerError> {
        let id = match self.client.submit(request).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.submission_failures.inc();
                }
                tracing::warn!(kind = %request.kind(), "verification submission failed: {e}");
                return Err(CheckerError::Submission(e.to_string()));
            }
        };
        if let Some(m) = &self.metrics {
            m.submissions.inc();
        }
        tracing::debug!(%id, kind = %request.kind(), "verification submitted");

        self.poll(&id, request.requirements().timeout(), cancel).await
    }

    /// Poll an already-submitted verification.
    ///
    /// The deadline is `timeout` from now.
    pub async fn poll(
        &self,
        id: &str,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<VerificationResult, CheckerError> {
        let started = Instant::now();
        let deadline = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0u32;
        let mut transient_failures = 0u32;

        while attempts < max_attempts {
            if cancel.is_cancelled() {
                return Err(self.cancelled(id));
            }
            attempts += 1;
            if let Some(m) = &self.metrics {
                m.fetch_attempts.inc();
            }

            let fetched = tokio::select! {
                res = tokio::time::timeout_at(deadline, self.client.fetch(id)) => res,
                _ = cancel.cancelled() => return Err(self.cancelled(id)),
            };

            match fetched {
                // The fetch itself outlived the deadline.
                Err(_) => break,
                Ok(Ok(result)) if result.is_terminal() => {
                    tracing::info!(
                        %id,
                        status = %result.status,
                        confidence = result.confidence,
                        validators = result.validator_count,
                        attempts,
                        "verification reached terminal status"
                    );
                    if let Some(m) = &self.metrics {
                        m.record_verdict(result.status);
                        m.time_to_verdict_ms
                            .observe(started.elapsed().as_millis() as f64);
                    }
                    return Ok(result);
                }
                Ok(Ok(_)) => {
                    tracing::debug!(%id, attempt = attempts, "verification still pending");
                }
                Ok(Err(e)) if e.is_transient() => {
                    transient_failures += 1;
                    if let Some(m) = &self.metrics {
                        m.transient_failures.inc();
                    }
                    tracing::warn!(%id, attempt = attempts, "transient fetch failure: {e}");
                }
                Ok(Err(e)) => {
                    tracing::warn!(%id, attempt = attempts, "verification poll failed: {e}");
                    return Err(e);
                }
            }

            if attempts == max_attempts {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let delay = self.config.delay_after(attempts).min(deadline - now);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(self.cancelled(id)),
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        if let Some(m) = &self.metrics {
            m.timeouts.inc();
        }
        tracing::warn!(
            %id,
            attempts,
            transient_failures,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "verification still pending at deadline"
        );
        Err(CheckerError::Timeout {
            id: id.to_string(),
            attempts,
        })
    }

    fn cancelled(&self, id: &str) -> CheckerError {
        if let Some(m) = &self.metrics {
            m.cancellations.inc();
        }
        tracing::info!(%id, "verification poll cancelled by caller");
        CheckerError::Cancelled { id: id.to_string() }
    }
}
