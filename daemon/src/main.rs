//! attest CLI: entry point for running verifications against a validator network.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use futures_util::StreamExt;
use serde::Serialize;

use attest_checker::{CancelSignal, CheckerMetrics, VerificationService};
use attest_registry::{IntegrationConfigs, IntegrationRegistry, RegistryConfig};
use attest_types::NetworkId;
use attest_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "attest", about = "Verify claims against a decentralized validator network")]
struct Cli {
    /// Built-in endpoint profile: "development" (testnet) or "production" (mainnet).
    #[arg(long, default_value = "development", env = "ATTEST_PROFILE")]
    profile: String,

    /// Path to a TOML configuration file. Its settings overlay the profile;
    /// CLI flags and env vars override both.
    #[arg(long, env = "ATTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Network for the verification integration: "mainnet" or "testnet".
    #[arg(long, env = "ATTEST_NETWORK")]
    network: Option<String>,

    /// Validator network base URL.
    #[arg(long, env = "ATTEST_VERIFICATION_URL")]
    verification_url: Option<String>,

    /// Validator network API key.
    #[arg(long, env = "ATTEST_VERIFICATION_API_KEY", hide_env_values = true)]
    verification_api_key: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "ATTEST_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "ATTEST_LOG_FORMAT")]
    log_format: String,

    /// Print verification metrics (Prometheus text format) to stderr on exit.
    #[arg(long, env = "ATTEST_PRINT_METRICS")]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Initialize every configured integration and report which came up.
    Integrations,

    /// Submit a claim and wait for the network's verdict.
    Verify {
        #[command(subcommand)]
        claim: Claim,
    },

    /// Show validator network status.
    Status,

    /// List past verifications for a subject, newest first.
    History {
        subject: String,

        /// Stop after this many results.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(clap::Subcommand)]
enum Claim {
    /// Verify an agent identity.
    Identity {
        subject: String,

        /// Credentials as a JSON document.
        #[arg(long, default_value = "{}")]
        credentials: String,
    },

    /// Verify an on-chain transaction.
    Transaction {
        tx_hash: String,

        #[arg(long)]
        chain: String,
    },

    /// Verify a claimed position.
    Location {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Supporting evidence as a JSON array.
        #[arg(long, default_value = "[]")]
        evidence: String,
    },
}

#[derive(Serialize)]
struct IntegrationsReport {
    registered: Vec<String>,
    skipped: BTreeMap<String, String>,
}

fn load_config(cli: &Cli) -> anyhow::Result<RegistryConfig> {
    let mut config = match cli.profile.to_lowercase().as_str() {
        "development" | "dev" => RegistryConfig::development(),
        "production" | "prod" => RegistryConfig::production(),
        other => return Err(anyhow!("unknown profile: {other}")),
    };

    if let Some(ref path) = cli.config {
        let file = RegistryConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        config = config.merge(file);
    }

    if let Some(ref network) = cli.network {
        let network: NetworkId = network.parse()?;
        config.set("verification", "network", network.as_str());
    }
    if let Some(ref url) = cli.verification_url {
        config.set("verification", "baseUrl", url.as_str());
    }
    if let Some(ref key) = cli.verification_api_key {
        config.set("verification", "apiKey", key.as_str());
    }
    Ok(config)
}

/// Initialize only the verification entry and return it.
async fn verification_service(
    config: &RegistryConfig,
    metrics: Arc<CheckerMetrics>,
) -> anyhow::Result<Arc<VerificationService>> {
    let mut only = IntegrationConfigs::new();
    let settings = config
        .configs()
        .get("verification")
        .cloned()
        .ok_or_else(|| anyhow!("no verification integration configured"))?;
    only.insert("verification".into(), settings);

    let mut registry = IntegrationRegistry::new().with_metrics(metrics);
    let mut report = registry.initialize_all(&only).await;
    if let Some(reason) = report.skipped.remove("verification") {
        return Err(reason.into());
    }
    registry
        .verification()
        .ok_or_else(|| anyhow!("verification integration unavailable"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format: LogFormat = cli.log_format.parse().map_err(|e: String| anyhow!(e))?;
    init_logging(format, &cli.log_level);

    let config = load_config(&cli)?;
    let metrics = Arc::new(CheckerMetrics::new());

    let cancel = Arc::new(CancelSignal::new());
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move { cancel.cancel_on_ctrl_c().await });
    }

    match cli.command {
        Command::Integrations => {
            let mut registry = IntegrationRegistry::new().with_metrics(Arc::clone(&metrics));
            let report = registry.initialize_all(config.configs()).await;
            print_json(&IntegrationsReport {
                registered: report.registered,
                skipped: report
                    .skipped
                    .into_iter()
                    .map(|(name, reason)| (name, reason.to_string()))
                    .collect(),
            })?;
        }
        Command::Verify { claim } => {
            let service = verification_service(&config, Arc::clone(&metrics)).await?;
            let token = cancel.token();
            let started = std::time::Instant::now();
            let result = match claim {
                Claim::Identity {
                    subject,
                    credentials,
                } => {
                    let credentials = serde_json::from_str(&credentials)
                        .context("--credentials must be JSON")?;
                    service.verify_identity(&subject, credentials, &token).await?
                }
                Claim::Transaction { tx_hash, chain } => {
                    service.verify_transaction(&tx_hash, &chain, &token).await?
                }
                Claim::Location { lat, lon, evidence } => {
                    let evidence = serde_json::from_str(&evidence)
                        .context("--evidence must be a JSON array")?;
                    service.verify_location(lat, lon, evidence, &token).await?
                }
            };
            tracing::info!(
                "verification {} finished {} after {}",
                result.id,
                result.status,
                format_duration(started.elapsed())
            );
            print_json(&result)?;
        }
        Command::Status => {
            let service = verification_service(&config, Arc::clone(&metrics)).await?;
            print_json(&service.network_status().await?)?;
        }
        Command::History { subject, limit } => {
            let service = verification_service(&config, Arc::clone(&metrics)).await?;
            let results: Vec<_> = service
                .history(&subject)
                .take(limit)
                .collect::<Vec<_>>()
                .await
                .into_iter()
                .collect::<Result<_, _>>()?;
            print_json(&results)?;
        }
    }

    if cli.print_metrics {
        eprint!("{}", metrics.encode_text());
    }
    Ok(())
}
