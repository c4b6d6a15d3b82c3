//! Minimal JSON-RPC 2.0 transport over HTTP.
//!
//! Used by integrations whose upstream speaks JSON-RPC (storage nodes,
//! agent-network RPC nodes). One POST per call; no retries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonRpcError {
    #[error("invalid JSON-RPC client configuration: {0}")]
    Config(String),

    #[error("JSON-RPC transport failed: {0}")]
    Transport(String),

    #[error("JSON-RPC endpoint returned HTTP {0}")]
    Http(u16),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
}

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    /// Some nodes put the useful detail here instead of `message`.
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// HTTP client bound to one JSON-RPC endpoint.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `url`, optionally sending `Authorization: Bearer <token>`.
    pub fn new(url: &str, token: Option<&str>, timeout: Duration) -> Result<Self, JsonRpcError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| JsonRpcError::Config(format!("invalid endpoint {url}: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| JsonRpcError::Config(format!("invalid token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| JsonRpcError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: parsed.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke `method` and decode its `result`.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, JsonRpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let body = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JsonRpcError::Transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    JsonRpcError::Transport(format!("connection failed: {e}"))
                } else {
                    JsonRpcError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(JsonRpcError::Http(response.status().as_u16()));
        }

        let decoded: Response = response
            .json()
            .await
            .map_err(|e| JsonRpcError::InvalidResponse(e.to_string()))?;

        if let Some(err) = decoded.error {
            let message = match err.data {
                Some(data) if err.message.is_empty() || err.message == "Server error" => {
                    data.to_string()
                }
                _ => err.message,
            };
            tracing::debug!(method, code = err.code, "JSON-RPC call returned an error");
            return Err(JsonRpcError::Rpc {
                code: err.code,
                message,
            });
        }

        let result = decoded.result.ok_or_else(|| {
            JsonRpcError::InvalidResponse(format!("{method}: response has neither result nor error"))
        })?;
        serde_json::from_value(result)
            .map_err(|e| JsonRpcError::InvalidResponse(format!("{method}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/rpc")
    }

    #[tokio::test]
    async fn decodes_result_and_echoes_method() {
        let app = Router::new().route(
            "/rpc",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "jsonrpc": "2.0", "id": body["id"], "result": { "method": body["method"] } }))
            }),
        );
        let url = serve(app).await;
        let client = JsonRpcClient::new(&url, None, Duration::from_secs(5)).unwrap();
        let out: Value = client.call("Filecoin.ChainHead", json!([])).await.unwrap();
        assert_eq!(out["method"], "Filecoin.ChainHead");
    }

    #[tokio::test]
    async fn surfaces_rpc_errors() {
        let app = Router::new().route(
            "/rpc",
            post(|| async {
                Json(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "method not found" } }))
            }),
        );
        let url = serve(app).await;
        let client = JsonRpcClient::new(&url, Some("tok"), Duration::from_secs(5)).unwrap();
        let err = client.call::<_, Value>("nope", json!([])).await.unwrap_err();
        assert!(matches!(err, JsonRpcError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn rejects_bad_url() {
        assert!(matches!(
            JsonRpcClient::new("::::", None, Duration::from_secs(1)),
            Err(JsonRpcError::Config(_))
        ));
    }
}
