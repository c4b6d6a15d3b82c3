//! Storage-network integration: chain head, network identity and storage
//! deals, read from a Lotus node over JSON-RPC.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::StorageClient;
pub use config::StorageConfig;
pub use error::StorageError;
pub use types::{ChainHead, Cid, StorageDeal, StorageNetworkStatus};
