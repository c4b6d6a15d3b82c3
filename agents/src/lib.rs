//! Agent-network integration: looks up deployed agents through the view
//! methods of the agent-registry contract.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AgentNetworkClient;
pub use config::AgentsConfig;
pub use error::AgentsError;
pub use types::{AgentStatus, AgentWallets, DeployedAgent};
