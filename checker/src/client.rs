//! I/O boundary to one validator-network endpoint.
//!
//! [`VerificationClient`] is the seam the poller and service depend on;
//! [`HttpVerificationClient`] is the production implementation. Clients never
//! retry: retry policy belongs to the poller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};

use attest_types::{NetworkId, NetworkStatus, VerificationRequest, VerificationResult};

use crate::config::VerificationConfig;
use crate::error::CheckerError;
use crate::wire::{RawHistory, RawNetworkStatus, RawResult, SubmitBody, SubmitResponse};

/// Default page size for history reads.
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 100;

/// Maximum page size a history read may ask for.
pub const MAX_HISTORY_PAGE_SIZE: u32 = 1000;

/// One page of a subject's past verifications, newest first.
#[derive(Clone, Debug, Default)]
pub struct HistoryPage {
    pub items: Vec<VerificationResult>,
    /// Cursor for the next page, or `None` if this is the last page.
    pub next_cursor: Option<String>,
}

/// Stateless access to a remote validator network.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    /// Send a claim to the network and return the id it was assigned.
    async fn submit(&self, request: &VerificationRequest) -> Result<String, CheckerError>;

    /// Idempotent read of a verification's current snapshot.
    async fn fetch(&self, id: &str) -> Result<VerificationResult, CheckerError>;

    /// Current validator pool health.
    async fn network_status(&self) -> Result<NetworkStatus, CheckerError>;

    /// Read one page of a subject's history.
    async fn history_page(
        &self,
        subject_id: &str,
        cursor: Option<&str>,
        count: u32,
    ) -> Result<HistoryPage, CheckerError>;
}

/// HTTP/JSON client for the validator network API.
///
/// - `POST {base}/verify` → `{verificationId}`
/// - `GET {base}/verify/{id}` → result snapshot
/// - `GET {base}/network/status`
/// - `GET {base}/verify/history/{subject}?cursor=&count=`
#[derive(Clone, Debug)]
pub struct HttpVerificationClient {
    /// HTTP client (reusable connection pool).
    http: reqwest::Client,
    base: Url,
    network: NetworkId,
}

impl HttpVerificationClient {
    pub fn new(config: &VerificationConfig) -> Result<Self, CheckerError> {
        config.validate()?;
        let base = Url::parse(config.base_url.trim())
            .map_err(|e| CheckerError::Config(format!("invalid baseUrl: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(CheckerError::Config(format!(
                "baseUrl {base} cannot be used as a base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| CheckerError::Config(format!("invalid apiKey: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| CheckerError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base,
            network: config.network,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CheckerError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CheckerError::Config(format!("baseUrl {} has no path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CheckerError> {
        response
            .json()
            .await
            .map_err(|e| CheckerError::InvalidResponse(format!("failed to parse body: {e}")))
    }
}

fn map_send_error(e: reqwest::Error) -> CheckerError {
    if e.is_timeout() {
        CheckerError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        CheckerError::Transport(format!("connection failed: {e}"))
    } else {
        CheckerError::Transport(e.to_string())
    }
}

fn status_error(status: StatusCode) -> CheckerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CheckerError::Transport(format!("not authorized: HTTP status {status}"))
        }
        _ => CheckerError::Transport(format!("HTTP status {status}")),
    }
}

#[async_trait]
impl VerificationClient for HttpVerificationClient {
    async fn submit(&self, request: &VerificationRequest) -> Result<String, CheckerError> {
        let url = self.endpoint(&["verify"])?;
        let body = SubmitBody {
            request,
            network: self.network,
        };
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        let submitted: SubmitResponse = Self::decode(response).await?;
        if submitted.verification_id.is_empty() {
            return Err(CheckerError::InvalidResponse(
                "empty verificationId in submit response".into(),
            ));
        }
        Ok(submitted.verification_id)
    }

    async fn fetch(&self, id: &str) -> Result<VerificationResult, CheckerError> {
        let url = self.endpoint(&["verify", id])?;
        let response = self.http.get(url).send().await.map_err(map_send_error)?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(CheckerError::NotFound(id.to_string())),
            s => return Err(status_error(s)),
        }
        let raw: RawResult = Self::decode(response).await?;
        raw.into_result()
    }

    async fn network_status(&self) -> Result<NetworkStatus, CheckerError> {
        let url = self.endpoint(&["network", "status"])?;
        let response = self.http.get(url).send().await.map_err(map_send_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        let raw: RawNetworkStatus = Self::decode(response).await?;
        Ok(raw.into())
    }

    async fn history_page(
        &self,
        subject_id: &str,
        cursor: Option<&str>,
        count: u32,
    ) -> Result<HistoryPage, CheckerError> {
        let url = self.endpoint(&["verify", "history", subject_id])?;
        let count = count.clamp(1, MAX_HISTORY_PAGE_SIZE).to_string();
        let mut query = vec![("count", count.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let response = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(map_send_error)?;

        match response.status() {
            s if s.is_success() => {}
            // No history recorded for this subject.
            StatusCode::NOT_FOUND => return Ok(HistoryPage::default()),
            s => return Err(status_error(s)),
        }

        let (raw_items, next_cursor) = match Self::decode::<RawHistory>(response).await? {
            RawHistory::Page { items, cursor } => (items, cursor.filter(|c| !c.is_empty())),
            RawHistory::List(items) => (items, None),
        };
        let items = raw_items
            .into_iter()
            .map(RawResult::into_result)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HistoryPage { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpVerificationClient {
        HttpVerificationClient::new(&VerificationConfig::new(base, NetworkId::Testnet)).unwrap()
    }

    #[test]
    fn endpoint_joins_segments_without_double_slash() {
        let c = client("https://api.example.test/v1/");
        let url = c.endpoint(&["verify", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/v1/verify/abc");
    }

    #[test]
    fn endpoint_escapes_path_segments() {
        let c = client("https://api.example.test/v1");
        let url = c.endpoint(&["verify", "history", "agent 42/x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.test/v1/verify/history/agent%2042%2Fx"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = HttpVerificationClient::new(&VerificationConfig::new(
            "not a url",
            NetworkId::Testnet,
        ))
        .unwrap_err();
        assert!(matches!(err, CheckerError::Config(_)));
    }

    #[test]
    fn rejects_api_key_with_control_characters() {
        let mut cfg = VerificationConfig::new("https://api.example.test", NetworkId::Mainnet);
        cfg.api_key = Some("bad\nkey".into());
        assert!(matches!(
            HttpVerificationClient::new(&cfg),
            Err(CheckerError::Config(_))
        ));
    }
}
