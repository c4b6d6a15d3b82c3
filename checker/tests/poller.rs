//! Consensus poller behaviour against a scripted validator network.
//!
//! Every test runs on paused tokio time, so 2-second poll intervals and
//! minute-long deadlines complete instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use attest_checker::{
    Backoff, CancelSignal, CancelToken, CheckerError, CheckerMetrics, ConsensusPoller, PollConfig,
};
use attest_nullables::{snapshot, NullVerificationClient};
use attest_types::{ConsensusRequirements, VerificationKind, VerificationRequest, VerificationStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn request(timeout: Duration) -> VerificationRequest {
    VerificationRequest::new(
        VerificationKind::Data,
        serde_json::json!({ "digest": "abc" }),
        ConsensusRequirements::new(3, 0.8, timeout).unwrap(),
    )
}

fn poller(client: &Arc<NullVerificationClient>) -> ConsensusPoller {
    ConsensusPoller::new(client.clone(), PollConfig::default())
}

// ---------------------------------------------------------------------------
// Terminal detection
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn first_terminal_observation_wins() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_pending(2)
            .then_result(snapshot("null-verification-1", VerificationStatus::Verified, 0.9))
            .then_result(snapshot("null-verification-1", VerificationStatus::Rejected, 0.9)),
    );
    let result = poller(&client)
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(client.fetch_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn network_side_timeout_is_a_terminal_result_not_an_error() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_result(snapshot("null-verification-1", VerificationStatus::Timeout, 0.0)),
    );
    let result = poller(&client)
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::Timeout);
}

#[tokio::test(start_paused = true)]
async fn polls_are_spaced_by_the_configured_interval() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_pending(3)
            .then_result(snapshot("null-verification-1", VerificationStatus::Verified, 0.8)),
    );
    let started = tokio::time::Instant::now();
    poller(&client)
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(6));
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn attempt_bound_raises_timeout_without_extra_fetches() {
    let client = Arc::new(NullVerificationClient::new());
    let config = PollConfig {
        interval_ms: 100,
        max_attempts: 7,
        backoff: Backoff::Fixed,
    };
    let err = ConsensusPoller::new(client.clone(), config)
        .run(&request(Duration::from_secs(3600)), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::Timeout { attempts: 7, .. }));
    assert_eq!(client.fetch_calls(), 7);
}

#[tokio::test(start_paused = true)]
async fn deadline_cuts_polling_short() {
    let client = Arc::new(NullVerificationClient::new());
    let started = tokio::time::Instant::now();
    let err = poller(&client)
        .run(&request(Duration::from_secs(10)), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::Timeout { .. }));
    // Fetches at t = 0, 2, 4, 6, 8; the deadline lands during the next sleep.
    assert_eq!(client.fetch_calls(), 5);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn unbounded_timeout_polls_until_verdict() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_pending(2)
            .then_result(snapshot("null-verification-1", VerificationStatus::Verified, 0.8)),
    );
    let result = poller(&client)
        .run(&request(Duration::MAX), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(client.fetch_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn unbounded_timeout_still_honours_the_attempt_bound() {
    let client = Arc::new(NullVerificationClient::new());
    let config = PollConfig {
        interval_ms: 100,
        max_attempts: 4,
        backoff: Backoff::Fixed,
    };
    let err = ConsensusPoller::new(client.clone(), config)
        .run(&request(Duration::MAX), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::Timeout { attempts: 4, .. }));
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn submit_failure_fails_fast_without_polling() {
    let client = Arc::new(
        NullVerificationClient::new().fail_submit(CheckerError::Transport("refused".into())),
    );
    let err = poller(&client)
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::Submission(_)));
    assert_eq!(client.fetch_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_tolerated_until_a_verdict() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_error(CheckerError::Transport("reset".into()))
            .then_error(CheckerError::InvalidResponse("truncated".into()))
            .then_error(CheckerError::Transport("reset".into()))
            .then_result(snapshot("null-verification-1", VerificationStatus::Rejected, 0.7)),
    );
    let metrics = Arc::new(CheckerMetrics::new());
    let result = poller(&client)
        .with_metrics(metrics.clone())
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(result.status, VerificationStatus::Rejected);
    assert_eq!(client.fetch_calls(), 4);
    assert_eq!(metrics.transient_failures.get(), 3);
    assert_eq!(metrics.verdicts.with_label_values(&["rejected"]).get(), 1);
}

#[tokio::test(start_paused = true)]
async fn persistent_transport_failure_collapses_into_timeout() {
    let mut client = NullVerificationClient::new();
    for _ in 0..30 {
        client = client.then_error(CheckerError::Transport("down".into()));
    }
    let client = Arc::new(client);
    let err = poller(&client)
        .run(&request(Duration::from_secs(120)), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::Timeout { attempts: 30, .. }));
}

#[tokio::test(start_paused = true)]
async fn not_found_is_permanent() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_pending(1)
            .then_error(CheckerError::NotFound("null-verification-1".into())),
    );
    let err = poller(&client)
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::NotFound(_)));
    assert_eq!(client.fetch_calls(), 2);
}

// ---------------------------------------------------------------------------
// Cancellation and backoff
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_the_poll_early() {
    let client = Arc::new(NullVerificationClient::new());
    let signal = CancelSignal::new();
    let token = signal.token();
    let p = poller(&client);
    let req = request(Duration::from_secs(60));

    let handle = tokio::spawn(async move { p.run(&req, &token).await });
    tokio::time::sleep(Duration::from_secs(5)).await;
    signal.cancel();

    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, CheckerError::Cancelled { .. }));
    assert!(client.fetch_calls() <= 3);
}

#[tokio::test(start_paused = true)]
async fn exponential_backoff_stretches_the_waits() {
    let client = Arc::new(
        NullVerificationClient::new()
            .then_pending(3)
            .then_result(snapshot("null-verification-1", VerificationStatus::Verified, 0.95)),
    );
    let config = PollConfig {
        interval_ms: 1_000,
        max_attempts: 10,
        backoff: Backoff::Exponential {
            factor: 2.0,
            max_interval_ms: 60_000,
        },
    };
    let started = tokio::time::Instant::now();
    ConsensusPoller::new(client.clone(), config)
        .run(&request(Duration::from_secs(60)), &CancelToken::never())
        .await
        .unwrap();
    // 1 s + 2 s + 4 s between the four fetches.
    assert_eq!(started.elapsed(), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn concurrent_requests_are_independent() {
    let verified = Arc::new(
        NullVerificationClient::new()
            .with_id("a")
            .then_pending(1)
            .then_result(snapshot("a", VerificationStatus::Verified, 0.9)),
    );
    let rejected = Arc::new(
        NullVerificationClient::new()
            .with_id("b")
            .then_result(snapshot("b", VerificationStatus::Rejected, 0.9)),
    );
    let req_a = request(Duration::from_secs(60));
    let req_b = request(Duration::from_secs(60));
    let (pa, pb) = (poller(&verified), poller(&rejected));
    let never = CancelToken::never();

    let (a, b) = tokio::join!(pa.run(&req_a, &never), pb.run(&req_b, &never));
    assert_eq!(a.unwrap().id, "a");
    assert_eq!(b.unwrap().status, VerificationStatus::Rejected);
}
