//! HTTP client tests against an in-process validator network served by axum.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::{json, Value};

use attest_checker::{
    CancelToken, CheckerError, HttpVerificationClient, PollConfig, VerificationClient,
    VerificationConfig, VerificationService,
};
use attest_types::{NetworkId, VerificationStatus};

// ---------------------------------------------------------------------------
// Fake validator network
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Network {
    polls: Arc<AtomicU32>,
    last_submit: Arc<Mutex<Option<Value>>>,
    last_auth: Arc<Mutex<Option<String>>>,
}

async fn submit(
    State(net): State<Network>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    *net.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *net.last_submit.lock().unwrap() = Some(body);
    Json(json!({ "verificationId": "v-1" }))
}

async fn fetch(
    State(net): State<Network>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    match id.as_str() {
        "v-1" => {
            let n = net.polls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Ok(Json(json!({ "id": "v-1", "status": "pending" })))
            } else {
                Ok(Json(json!({
                    "id": "v-1", "status": "verified", "confidence": 0.92,
                    "validators": 4, "consensus": 1.0,
                    "evidence": [{ "validator": "validator_1", "result": "verified", "confidence": 0.9 }],
                    "timestamp": 1700000000000u64, "cost": 0.1
                })))
            }
        }
        "conflict" => Ok(Json(json!({ "id": "conflict", "status": ["verified", "rejected"] }))),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn network_status() -> Json<Value> {
    Json(json!({
        "activeValidators": 150, "totalValidators": 200,
        "averageResponseTimeMs": 2500, "networkLoad": 0.65,
        "consensusRate": 0.92, "lastUpdate": 1700000000000u64
    }))
}

async fn history(
    Path(subject): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if subject != "agent-42" {
        return Err(StatusCode::NOT_FOUND);
    }
    let item = |id: &str, ts: u64| json!({ "id": id, "status": "verified", "timestamp": ts });
    let page = match params.get("cursor").map(String::as_str) {
        None => json!({ "items": [item("h1", 3000), item("h2", 2000)], "cursor": "page-2" }),
        Some("page-2") => json!({ "items": [item("h3", 1000)] }),
        Some(_) => return Err(StatusCode::BAD_REQUEST),
    };
    Ok(Json(page))
}

async fn spawn_network() -> (String, Network) {
    let net = Network::default();
    let app = Router::new()
        .route("/v1/verify", post(submit))
        .route("/v1/verify/:id", get(fetch))
        .route("/v1/network/status", get(network_status))
        .route("/v1/verify/history/:subject", get(history))
        .with_state(net.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1"), net)
}

fn config(base_url: &str) -> VerificationConfig {
    let mut cfg = VerificationConfig::new(base_url, NetworkId::Testnet);
    cfg.api_key = Some("secret".into());
    cfg.poll = PollConfig {
        interval_ms: 10,
        ..PollConfig::default()
    };
    cfg
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identity_round_trip_over_http() {
    let (base, net) = spawn_network().await;
    let service = VerificationService::from_config(&config(&base)).unwrap();

    let result = service
        .verify_identity("agent-42", json!({ "sig": "abc" }), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(result.confidence, 0.92);
    assert_eq!(result.validator_count, 4);
    assert_eq!(result.evidence.len(), 1);
    assert_eq!(net.polls.load(Ordering::SeqCst), 2);

    let body = net.last_submit.lock().unwrap().clone().unwrap();
    assert_eq!(body["kind"], "identity");
    assert_eq!(body["network"], "testnet");
    assert_eq!(body["payload"]["agentId"], "agent-42");
    assert_eq!(body["requirements"]["minValidators"], 3);
    assert_eq!(body["requirements"]["timeoutMs"], 30_000);
    assert_eq!(net.last_auth.lock().unwrap().as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn conflicting_response_fails_closed() {
    let (base, _net) = spawn_network().await;
    let client = HttpVerificationClient::new(&config(&base)).unwrap();
    let result = client.fetch("conflict").await.unwrap();
    assert_eq!(result.status, VerificationStatus::Rejected);
}

#[tokio::test]
async fn unknown_id_is_not_found_and_server_error_is_transport() {
    let (base, _net) = spawn_network().await;
    let client = HttpVerificationClient::new(&config(&base)).unwrap();
    assert!(matches!(
        client.fetch("nope").await,
        Err(CheckerError::NotFound(id)) if id == "nope"
    ));
    assert!(matches!(
        client.fetch("broken").await,
        Err(CheckerError::Transport(_))
    ));
}

#[tokio::test]
async fn unreachable_network_fails_submission() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut cfg = config(&format!("http://{addr}/v1"));
    cfg.request_timeout_secs = 2;
    let service = VerificationService::from_config(&cfg).unwrap();
    let err = service
        .verify_transaction("0xabc", "near", &CancelToken::never())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::Submission(_)));
}

#[tokio::test]
async fn network_status_decodes() {
    let (base, _net) = spawn_network().await;
    let client = HttpVerificationClient::new(&config(&base)).unwrap();
    let status = client.network_status().await.unwrap();
    assert_eq!(status.active_validators, 150);
    assert_eq!(status.average_response_time_ms, 2500);
    assert_eq!(status.last_update.as_secs(), 1_700_000_000);
}

#[tokio::test]
async fn history_follows_cursors() {
    let (base, _net) = spawn_network().await;
    let service = VerificationService::from_config(&config(&base)).unwrap();
    let ids: Vec<String> = service
        .history("agent-42")
        .map(|r| r.unwrap().id)
        .collect()
        .await;
    assert_eq!(ids, vec!["h1", "h2", "h3"]);

    let none: Vec<_> = service.history("someone-else").collect().await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn request_timeout_applies_to_slow_endpoints() {
    let app = Router::new().route(
        "/verify/:id",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "id": "slow", "status": "pending" }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut cfg = VerificationConfig::new(format!("http://{addr}"), NetworkId::Mainnet);
    cfg.request_timeout_secs = 1;
    let client = HttpVerificationClient::new(&cfg).unwrap();
    assert!(matches!(
        client.fetch("slow").await,
        Err(CheckerError::Transport(_))
    ));
}
