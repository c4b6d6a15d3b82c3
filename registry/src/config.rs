//! Registry configuration: integration name to that integration's settings.
//!
//! Settings stay untyped here. Each integration parses its own entry during
//! [`IntegrationRegistry::initialize_all`](crate::IntegrationRegistry::initialize_all),
//! so a bad entry only affects itself.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::RegistryError;

/// Integration name → settings object, in name order.
pub type IntegrationConfigs = BTreeMap<String, Value>;

/// Loadable set of integration settings.
///
/// ```toml
/// [verification]
/// baseUrl = "https://api.checker.network/v1"
/// network = "testnet"
///
/// [storage]
/// endpoint = "https://api.node.glif.io/rpc/v1"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryConfig {
    pub integrations: IntegrationConfigs,
}

impl RegistryConfig {
    /// Testnet endpoints for every known integration.
    pub fn development() -> Self {
        Self::profile(
            "testnet",
            "https://rpc.testnet.near.org",
            "https://testnet.mynearwallet.com/",
            "https://helper.testnet.near.org",
            "shade-agents.testnet",
        )
    }

    /// Mainnet endpoints for every known integration.
    pub fn production() -> Self {
        Self::profile(
            "mainnet",
            "https://rpc.mainnet.near.org",
            "https://app.mynearwallet.com/",
            "https://helper.mainnet.near.org",
            "shade-agents.near",
        )
    }

    fn profile(
        network: &str,
        node_url: &str,
        wallet_url: &str,
        helper_url: &str,
        contract_name: &str,
    ) -> Self {
        let mut integrations = IntegrationConfigs::new();
        integrations.insert(
            "verification".into(),
            json!({ "baseUrl": "https://api.checker.network/v1", "network": network }),
        );
        integrations.insert(
            "weather".into(),
            json!({ "baseUrl": "https://api.weatherxm.com/api/v1", "network": network }),
        );
        integrations.insert(
            "storage".into(),
            json!({ "endpoint": "https://api.node.glif.io/rpc/v1", "network": network }),
        );
        integrations.insert(
            "agents".into(),
            json!({
                "networkId": network,
                "nodeUrl": node_url,
                "walletUrl": wallet_url,
                "helperUrl": helper_url,
                "contractName": contract_name,
            }),
        );
        Self { integrations }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RegistryError> {
        toml::from_str(s).map_err(|e| RegistryError::Config(e.to_string()))
    }

    /// Overlay `other` onto `self`. Keys present in `other` win; integrations
    /// or keys only in `self` are kept.
    pub fn merge(mut self, other: RegistryConfig) -> Self {
        for (name, value) in other.integrations {
            match (self.integrations.get_mut(&name), value) {
                (Some(Value::Object(base)), Value::Object(overlay)) => base.extend(overlay),
                (_, value) => {
                    self.integrations.insert(name, value);
                }
            }
        }
        self
    }

    /// Set one key of one integration, creating the integration entry if needed.
    pub fn set(&mut self, integration: &str, key: &str, value: impl Into<Value>) {
        let entry = self
            .integrations
            .entry(integration.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), value.into());
        }
    }

    /// Drop an integration so it is never initialized.
    pub fn remove(&mut self, integration: &str) -> Option<Value> {
        self.integrations.remove(integration)
    }

    pub fn configs(&self) -> &IntegrationConfigs {
        &self.integrations
    }
}
