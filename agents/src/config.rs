//! Agent-network configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use attest_types::NetworkId;

use crate::error::AgentsError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    #[serde(default)]
    pub network_id: NetworkId,

    /// JSON-RPC node, e.g. `https://rpc.testnet.near.org`.
    pub node_url: String,

    /// Account hosting the agent-registry contract.
    pub contract_name: String,

    /// Kept for wallet front ends; not used for read-only access.
    #[serde(default)]
    pub wallet_url: Option<String>,

    #[serde(default)]
    pub helper_url: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl AgentsConfig {
    pub fn new(
        network_id: NetworkId,
        node_url: impl Into<String>,
        contract_name: impl Into<String>,
    ) -> Self {
        Self {
            network_id,
            node_url: node_url.into(),
            contract_name: contract_name.into(),
            wallet_url: None,
            helper_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn validate(&self) -> Result<(), AgentsError> {
        if self.node_url.trim().is_empty() {
            return Err(AgentsError::Config("nodeUrl must not be empty".into()));
        }
        if self.contract_name.trim().is_empty() {
            return Err(AgentsError::Config("contractName must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
