use attest_utils::JsonRpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentsError {
    #[error("agents config error: {0}")]
    Config(String),

    #[error("agent network RPC failed: {0}")]
    Rpc(#[from] JsonRpcError),

    #[error("node reports chain {actual}, expected {expected}")]
    NetworkMismatch { expected: String, actual: String },

    #[error("contract call {method} failed: {message}")]
    ContractCall { method: String, message: String },

    #[error("invalid contract response from {method}: {message}")]
    InvalidResponse { method: String, message: String },
}
