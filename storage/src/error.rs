use attest_utils::JsonRpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage config error: {0}")]
    Config(String),

    #[error("storage node call failed: {0}")]
    Rpc(#[from] JsonRpcError),

    #[error("invalid storage address: {0}")]
    InvalidAddress(String),
}
