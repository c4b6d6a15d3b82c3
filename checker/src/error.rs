use thiserror::Error;

use attest_types::TypesError;

#[derive(Debug, Error)]
pub enum CheckerError {
    /// Network or auth failure talking to the validator network.
    #[error("validator network unreachable: {0}")]
    Transport(String),

    /// The polled id is unknown upstream.
    #[error("verification {0} not found")]
    NotFound(String),

    /// The response arrived but could not be decoded.
    #[error("invalid response from validator network: {0}")]
    InvalidResponse(String),

    /// The initial submission failed; no polling was attempted.
    #[error("failed to submit verification: {0}")]
    Submission(String),

    /// Still pending when the deadline or attempt bound was reached.
    #[error("verification {id} timed out after {attempts} polls")]
    Timeout { id: String, attempts: u32 },

    /// The caller abandoned the poll.
    #[error("verification {id} cancelled")]
    Cancelled { id: String },

    /// A required configuration field is missing or invalid.
    #[error("verification config error: {0}")]
    Config(String),

    /// The request was rejected locally before submission.
    #[error("invalid verification request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Types(#[from] TypesError),
}

impl CheckerError {
    /// Whether the poller should keep going after seeing this error on a fetch.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidResponse(_))
    }
}
