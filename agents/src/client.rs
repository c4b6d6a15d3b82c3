//! View-call client for the agent-registry contract.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use attest_types::NetworkId;
use attest_utils::JsonRpcClient;

use crate::config::AgentsConfig;
use crate::error::AgentsError;
use crate::types::DeployedAgent;

#[derive(Deserialize)]
struct NodeStatus {
    chain_id: String,
}

#[derive(Serialize)]
struct CallFunction<'a> {
    request_type: &'static str,
    finality: &'static str,
    account_id: &'a str,
    method_name: &'a str,
    args_base64: String,
}

/// `query` result. Older nodes report contract failures inside `error`
/// instead of as a JSON-RPC error.
#[derive(Deserialize)]
struct CallResult {
    #[serde(default)]
    result: Option<Vec<u8>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug)]
pub struct AgentNetworkClient {
    rpc: JsonRpcClient,
    network: NetworkId,
    contract: String,
}

impl AgentNetworkClient {
    /// Connect to the node and check that it serves the configured network.
    pub async fn connect(config: &AgentsConfig) -> Result<Self, AgentsError> {
        config.validate()?;
        let rpc = JsonRpcClient::new(&config.node_url, None, config.request_timeout())?;
        let status: NodeStatus = rpc.call("status", json!([])).await?;
        if status.chain_id != config.network_id.as_str() {
            return Err(AgentsError::NetworkMismatch {
                expected: config.network_id.as_str().to_string(),
                actual: status.chain_id,
            });
        }
        tracing::info!(
            node = %config.node_url,
            contract = %config.contract_name,
            "connected to agent network {}",
            status.chain_id
        );
        Ok(Self {
            rpc,
            network: config.network_id,
            contract: config.contract_name.clone(),
        })
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    async fn view<T: DeserializeOwned>(&self, method: &str, args: Value) -> Result<T, AgentsError> {
        let params = CallFunction {
            request_type: "call_function",
            finality: "final",
            account_id: &self.contract,
            method_name: method,
            args_base64: BASE64.encode(args.to_string()),
        };
        let out: CallResult = self.rpc.call("query", params).await?;
        if let Some(message) = out.error {
            return Err(AgentsError::ContractCall {
                method: method.to_string(),
                message,
            });
        }
        let bytes = out.result.ok_or_else(|| AgentsError::InvalidResponse {
            method: method.to_string(),
            message: "missing result bytes".into(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| AgentsError::InvalidResponse {
            method: method.to_string(),
            message: e.to_string(),
        })
    }

    /// Look up one agent. `None` when the contract has no such agent.
    pub async fn get_agent(&self, agent_id: &str) -> Result<Option<DeployedAgent>, AgentsError> {
        self.view("get_agent", json!({ "agent_id": agent_id })).await
    }

    pub async fn agents_by_owner(&self, owner_id: &str) -> Result<Vec<DeployedAgent>, AgentsError> {
        self.view("get_agents_by_owner", json!({ "owner_id": owner_id }))
            .await
    }

    /// Balance in yoctoNEAR.
    pub async fn agent_balance(&self, agent_id: &str) -> Result<String, AgentsError> {
        self.view("get_agent_balance", json!({ "agent_id": agent_id }))
            .await
    }
}
