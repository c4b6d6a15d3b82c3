//! Nullable validator network — scripted responses, recorded calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use attest_checker::{CheckerError, HistoryPage, VerificationClient};
use attest_types::{
    NetworkStatus, Timestamp, VerificationRequest, VerificationResult, VerificationStatus,
};

/// Id handed out by [`NullVerificationClient::submit`] unless overridden.
pub const DEFAULT_ID: &str = "null-verification-1";

/// Build a result snapshot with the given status and confidence.
pub fn snapshot(id: &str, status: VerificationStatus, confidence: f64) -> VerificationResult {
    VerificationResult {
        id: id.to_string(),
        status,
        confidence,
        validator_count: 0,
        consensus_ratio: 0.0,
        evidence: Vec::new(),
        cost: 0.0,
        timestamp: Timestamp::new(1_700_000_000),
    }
}

/// A validator network that answers from a script.
///
/// `fetch` pops the next scripted response; once the script is exhausted it
/// keeps answering `pending`. `submit` answers with [`DEFAULT_ID`] unless a
/// submit error or id was scripted.
pub struct NullVerificationClient {
    submit_id: Mutex<String>,
    submit_error: Mutex<Option<CheckerError>>,
    fetch_script: Mutex<VecDeque<Result<VerificationResult, CheckerError>>>,
    network_status: Mutex<Option<NetworkStatus>>,
    history: Mutex<Vec<VerificationResult>>,
    submitted: Mutex<Vec<VerificationRequest>>,
    fetch_calls: AtomicU32,
    history_calls: AtomicU32,
}

impl NullVerificationClient {
    pub fn new() -> Self {
        Self {
            submit_id: Mutex::new(DEFAULT_ID.to_string()),
            submit_error: Mutex::new(None),
            fetch_script: Mutex::new(VecDeque::new()),
            network_status: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            fetch_calls: AtomicU32::new(0),
            history_calls: AtomicU32::new(0),
        }
    }

    /// Id returned by the next submissions.
    pub fn with_id(self, id: &str) -> Self {
        *self.submit_id.lock().unwrap() = id.to_string();
        self
    }

    /// Make the next submission fail with `error`.
    pub fn fail_submit(self, error: CheckerError) -> Self {
        *self.submit_error.lock().unwrap() = Some(error);
        self
    }

    /// Answer the next `n` fetches with `pending`.
    pub fn then_pending(self, n: usize) -> Self {
        let id = self.submit_id.lock().unwrap().clone();
        {
            let mut script = self.fetch_script.lock().unwrap();
            for _ in 0..n {
                script.push_back(Ok(snapshot(&id, VerificationStatus::Pending, 0.0)));
            }
        }
        self
    }

    /// Answer the next fetch with `result`.
    pub fn then_result(self, result: VerificationResult) -> Self {
        self.fetch_script.lock().unwrap().push_back(Ok(result));
        self
    }

    /// Answer the next fetch with `error`.
    pub fn then_error(self, error: CheckerError) -> Self {
        self.fetch_script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_network_status(self, status: NetworkStatus) -> Self {
        *self.network_status.lock().unwrap() = Some(status);
        self
    }

    /// Results served by `history_page`, in the order given.
    pub fn with_history(self, results: Vec<VerificationResult>) -> Self {
        *self.history.lock().unwrap() = results;
        self
    }

    /// Number of `fetch` calls so far.
    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `history_page` calls so far.
    pub fn history_calls(&self) -> u32 {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Every request passed to `submit`, including failed ones.
    pub fn submitted(&self) -> Vec<VerificationRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Default for NullVerificationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationClient for NullVerificationClient {
    async fn submit(&self, request: &VerificationRequest) -> Result<String, CheckerError> {
        self.submitted.lock().unwrap().push(request.clone());
        if let Some(error) = self.submit_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.submit_id.lock().unwrap().clone())
    }

    async fn fetch(&self, id: &str) -> Result<VerificationResult, CheckerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.fetch_script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(snapshot(id, VerificationStatus::Pending, 0.0)))
    }

    async fn network_status(&self) -> Result<NetworkStatus, CheckerError> {
        self.network_status
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CheckerError::Transport("null network has no status".into()))
    }

    async fn history_page(
        &self,
        _subject_id: &str,
        cursor: Option<&str>,
        count: u32,
    ) -> Result<HistoryPage, CheckerError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let history = self.history.lock().unwrap();
        let offset = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| CheckerError::InvalidResponse(format!("bad cursor {c}")))?,
            None => 0,
        };
        let end = (offset + count.max(1) as usize).min(history.len());
        let items = history.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_cursor = (end < history.len()).then(|| end.to_string());
        Ok(HistoryPage { items, next_cursor })
    }
}
