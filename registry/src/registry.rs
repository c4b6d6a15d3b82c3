//! The integration registry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;

use attest_agents::{AgentNetworkClient, AgentsConfig};
use attest_checker::{CheckerMetrics, VerificationConfig, VerificationService};
use attest_storage::{StorageClient, StorageConfig};
use attest_weather::{WeatherClient, WeatherConfig};

use crate::config::IntegrationConfigs;
use crate::error::RegistryError;

/// The integrations this registry knows how to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegrationKind {
    Verification,
    Weather,
    Storage,
    Agents,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 4] = [
        IntegrationKind::Verification,
        IntegrationKind::Weather,
        IntegrationKind::Storage,
        IntegrationKind::Agents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::Weather => "weather",
            Self::Storage => "storage",
            Self::Agents => "agents",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegrationKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownIntegration(s.to_string()))
    }
}

/// An initialized integration client.
#[derive(Clone)]
pub enum Integration {
    Verification(Arc<VerificationService>),
    Weather(Arc<WeatherClient>),
    Storage(Arc<StorageClient>),
    Agents(Arc<AgentNetworkClient>),
}

impl Integration {
    pub fn kind(&self) -> IntegrationKind {
        match self {
            Self::Verification(_) => IntegrationKind::Verification,
            Self::Weather(_) => IntegrationKind::Weather,
            Self::Storage(_) => IntegrationKind::Storage,
            Self::Agents(_) => IntegrationKind::Agents,
        }
    }
}

impl fmt::Debug for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Integration").field(&self.kind()).finish()
    }
}

/// Per-entry result of initialization.
#[derive(Debug)]
pub enum EntryOutcome {
    Ready(Integration),
    Skipped(RegistryError),
}

/// What [`IntegrationRegistry::initialize_all`] did with each entry.
#[derive(Debug, Default)]
pub struct InitReport {
    pub registered: Vec<String>,
    pub skipped: BTreeMap<String, RegistryError>,
}

impl InitReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Initializing,
    /// Reached once `initialize_all` returns, however many entries registered.
    Ready,
}

/// Named integration clients with uniform availability.
///
/// Entries are added only by [`initialize_all`](Self::initialize_all), which
/// takes `&mut self`; once it returns, the registry is read-only and can be
/// shared behind an `Arc`.
pub struct IntegrationRegistry {
    entries: BTreeMap<String, Integration>,
    state: RegistryState,
    metrics: Option<Arc<CheckerMetrics>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            state: RegistryState::Uninitialized,
            metrics: None,
        }
    }

    /// Record verification activity in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<CheckerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Build every configured integration concurrently and register those
    /// that come up. Failures are logged and reported, never returned.
    pub async fn initialize_all(&mut self, configs: &IntegrationConfigs) -> InitReport {
        self.state = RegistryState::Initializing;
        let metrics = self.metrics.clone();

        let outcomes = join_all(configs.iter().map(|(name, settings)| {
            let metrics = metrics.clone();
            async move { (name.clone(), build_entry(name, settings, metrics).await) }
        }))
        .await;

        let mut report = InitReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                EntryOutcome::Ready(_) if self.entries.contains_key(&name) => {
                    tracing::warn!("integration {name} is already registered, keeping the first");
                }
                EntryOutcome::Ready(integration) => {
                    tracing::info!("integration {name} registered");
                    self.entries.insert(name.clone(), integration);
                    report.registered.push(name);
                }
                EntryOutcome::Skipped(reason) => {
                    tracing::warn!("skipping integration {name}: {reason}");
                    report.skipped.insert(name, reason);
                }
            }
        }

        self.state = RegistryState::Ready;
        tracing::info!(
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            "integration registry ready"
        );
        report
    }

    pub fn get(&self, name: &str) -> Option<&Integration> {
        self.entries.get(name)
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Snapshot of every registered integration.
    pub fn get_all(&self) -> BTreeMap<String, Integration> {
        self.entries.clone()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn verification(&self) -> Option<Arc<VerificationService>> {
        match self.get(IntegrationKind::Verification.as_str())? {
            Integration::Verification(s) => Some(Arc::clone(s)),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<Arc<WeatherClient>> {
        match self.get(IntegrationKind::Weather.as_str())? {
            Integration::Weather(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn storage(&self) -> Option<Arc<StorageClient>> {
        match self.get(IntegrationKind::Storage.as_str())? {
            Integration::Storage(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn agents(&self) -> Option<Arc<AgentNetworkClient>> {
        match self.get(IntegrationKind::Agents.as_str())? {
            Integration::Agents(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }
}

impl Default for IntegrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse<T: DeserializeOwned>(name: &str, settings: &Value) -> Result<T, RegistryError> {
    serde_json::from_value(settings.clone()).map_err(|e| RegistryError::Configuration {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn setup_failed(name: &str, err: impl fmt::Display) -> RegistryError {
    RegistryError::Setup {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

async fn build_entry(
    name: &str,
    settings: &Value,
    metrics: Option<Arc<CheckerMetrics>>,
) -> EntryOutcome {
    match try_build(name, settings, metrics).await {
        Ok(integration) => EntryOutcome::Ready(integration),
        Err(reason) => EntryOutcome::Skipped(reason),
    }
}

async fn try_build(
    name: &str,
    settings: &Value,
    metrics: Option<Arc<CheckerMetrics>>,
) -> Result<Integration, RegistryError> {
    match name.parse::<IntegrationKind>()? {
        IntegrationKind::Verification => {
            let config: VerificationConfig = parse(name, settings)?;
            let mut service =
                VerificationService::from_config(&config).map_err(|e| setup_failed(name, e))?;
            if let Some(metrics) = metrics {
                service = service.with_metrics(metrics);
            }
            Ok(Integration::Verification(Arc::new(service)))
        }
        IntegrationKind::Weather => {
            let config: WeatherConfig = parse(name, settings)?;
            let client = WeatherClient::new(&config).map_err(|e| setup_failed(name, e))?;
            Ok(Integration::Weather(Arc::new(client)))
        }
        IntegrationKind::Storage => {
            let config: StorageConfig = parse(name, settings)?;
            let client = StorageClient::new(&config).map_err(|e| setup_failed(name, e))?;
            Ok(Integration::Storage(Arc::new(client)))
        }
        IntegrationKind::Agents => {
            let config: AgentsConfig = parse(name, settings)?;
            let client = AgentNetworkClient::connect(&config)
                .await
                .map_err(|e| setup_failed(name, e))?;
            Ok(Integration::Agents(Arc::new(client)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in IntegrationKind::ALL {
            assert_eq!(kind.as_str().parse::<IntegrationKind>().unwrap(), kind);
        }
        assert!(matches!(
            "payments".parse::<IntegrationKind>(),
            Err(RegistryError::UnknownIntegration(_))
        ));
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = IntegrationRegistry::new();
        assert_eq!(registry.state(), RegistryState::Uninitialized);
        assert!(!registry.is_available("verification"));
        assert!(registry.get_all().is_empty());
        assert!(registry.verification().is_none());
    }
}
