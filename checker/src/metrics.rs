//! Prometheus metrics for verification polling.
//!
//! [`CheckerMetrics`] owns a dedicated [`Registry`] so an embedding service can
//! encode it next to its own metrics without name clashes.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

use attest_types::VerificationStatus;

pub struct CheckerMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Claims accepted by the validator network.
    pub submissions: IntCounter,
    /// Submissions that failed before an id was assigned.
    pub submission_failures: IntCounter,
    /// Every `fetch` issued while polling.
    pub fetch_attempts: IntCounter,
    /// Fetches that failed with a retryable error.
    pub transient_failures: IntCounter,
    /// Terminal results returned to callers, labelled by status.
    pub verdicts: IntCounterVec,
    /// Polls that hit the deadline or attempt bound.
    pub timeouts: IntCounter,
    /// Polls abandoned by the caller.
    pub cancellations: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time from successful submission to terminal verdict, in milliseconds.
    pub time_to_verdict_ms: Histogram,
}

impl CheckerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let submissions = register_int_counter_with_registry!(
            Opts::new(
                "attest_verification_submissions_total",
                "Verification claims accepted by the validator network"
            ),
            registry
        )
        .expect("failed to register submissions counter");

        let submission_failures = register_int_counter_with_registry!(
            Opts::new(
                "attest_verification_submission_failures_total",
                "Verification submissions that failed"
            ),
            registry
        )
        .expect("failed to register submission_failures counter");

        let fetch_attempts = register_int_counter_with_registry!(
            Opts::new(
                "attest_verification_fetch_attempts_total",
                "Result fetches issued while polling"
            ),
            registry
        )
        .expect("failed to register fetch_attempts counter");

        let transient_failures = register_int_counter_with_registry!(
            Opts::new(
                "attest_verification_transient_failures_total",
                "Result fetches that failed with a retryable error"
            ),
            registry
        )
        .expect("failed to register transient_failures counter");

        let verdicts = register_int_counter_vec_with_registry!(
            Opts::new(
                "attest_verification_verdicts_total",
                "Terminal verification results by status"
            ),
            &["status"],
            registry
        )
        .expect("failed to register verdicts counter");

        let timeouts = register_int_counter_with_registry!(
            Opts::new(
                "attest_verification_timeouts_total",
                "Polls that ended while the verification was still pending"
            ),
            registry
        )
        .expect("failed to register timeouts counter");

        let cancellations = register_int_counter_with_registry!(
            Opts::new(
                "attest_verification_cancellations_total",
                "Polls abandoned by the caller"
            ),
            registry
        )
        .expect("failed to register cancellations counter");

        // 100 ms → ~100 s.
        let time_to_verdict_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "attest_verification_time_to_verdict_ms",
                "Time from submission to terminal verdict in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(100.0, 2.0, 11).unwrap()),
            registry
        )
        .expect("failed to register time_to_verdict_ms histogram");

        Self {
            registry,
            submissions,
            submission_failures,
            fetch_attempts,
            transient_failures,
            verdicts,
            timeouts,
            cancellations,
            time_to_verdict_ms,
        }
    }

    pub(crate) fn record_verdict(&self, status: VerificationStatus) {
        self.verdicts.with_label_values(&[status.as_str()]).inc();
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            tracing::warn!("failed to encode verification metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for CheckerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
