//! Storage integration configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use attest_types::NetworkId;

use crate::error::StorageError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Lotus JSON-RPC endpoint, e.g. `https://api.node.glif.io/rpc/v1`.
    pub endpoint: String,

    /// Lotus API token, sent as a bearer token.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub network: NetworkId,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl StorageConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            network: NetworkId::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        if self.endpoint.trim().is_empty() {
            return Err(StorageError::Config("endpoint must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
