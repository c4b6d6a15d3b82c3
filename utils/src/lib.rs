//! Shared utilities for the attest workspace.

pub mod jsonrpc;
pub mod logging;
pub mod time;

pub use jsonrpc::{JsonRpcClient, JsonRpcError};
pub use logging::{init_logging, LogFormat};
pub use time::format_duration;
