//! Verification against a remote validator network.
//!
//! A claim (identity, transaction, location, or arbitrary data) is submitted
//! to a network of independent validators, then polled until the network
//! reports a terminal verdict or a deadline passes.
//!
//! Layers, leaves first:
//! - [`VerificationClient`]: stateless I/O to one network endpoint.
//! - [`ConsensusPoller`]: the submit → poll → decide protocol.
//! - [`VerificationService`]: typed operations with risk-tuned requirements.
//!
//! This crate coordinates trust signals from a network operated elsewhere; it
//! does not itself run a consensus algorithm.

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod poller;
pub mod service;
pub mod wire;

pub use cancel::{CancelSignal, CancelToken};
pub use client::{HistoryPage, HttpVerificationClient, VerificationClient};
pub use config::{Backoff, PollConfig, VerificationConfig};
pub use error::CheckerError;
pub use history::HistoryStream;
pub use metrics::CheckerMetrics;
pub use poller::ConsensusPoller;
pub use service::{RiskTier, VerificationService, IDENTITY_TIER, LOCATION_TIER, TRANSACTION_TIER};
