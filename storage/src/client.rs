//! Lotus JSON-RPC client.

use serde_json::json;

use attest_types::{NetworkId, Timestamp};
use attest_utils::JsonRpcClient;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::types::{ChainHead, StorageDeal, StorageNetworkStatus};

#[derive(Debug)]
pub struct StorageClient {
    rpc: JsonRpcClient,
    network: NetworkId,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        config.validate()?;
        let rpc = JsonRpcClient::new(
            &config.endpoint,
            config.token.as_deref(),
            config.request_timeout(),
        )?;
        Ok(Self {
            rpc,
            network: config.network,
        })
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn endpoint(&self) -> &str {
        self.rpc.url()
    }

    pub async fn chain_head(&self) -> Result<ChainHead, StorageError> {
        Ok(self.rpc.call("Filecoin.ChainHead", json!([])).await?)
    }

    pub async fn network_name(&self) -> Result<String, StorageError> {
        Ok(self.rpc.call("Filecoin.StateNetworkName", json!([])).await?)
    }

    /// Chain height and network name, fetched together.
    pub async fn network_status(&self) -> Result<StorageNetworkStatus, StorageError> {
        let (head, name) = tokio::join!(self.chain_head(), self.network_name());
        let head = head?;
        let network_name = name?;
        tracing::debug!(network_name, height = head.height, "storage network status");
        Ok(StorageNetworkStatus {
            network_name,
            height: head.height,
            head: head.cids,
            observed_at: Timestamp::now(),
        })
    }

    /// Deals known to the node whose client is `address`.
    pub async fn deals_for(&self, address: &str) -> Result<Vec<StorageDeal>, StorageError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(StorageError::InvalidAddress("address must not be empty".into()));
        }
        // Lotus answers `null` rather than `[]` when it has no deals.
        let deals: Option<Vec<StorageDeal>> =
            self.rpc.call("Filecoin.ClientListDeals", json!([])).await?;
        Ok(deals
            .unwrap_or_default()
            .into_iter()
            .filter(|d| d.client == address)
            .collect())
    }
}
