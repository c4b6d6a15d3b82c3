//! Error type for constructing and parsing shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    #[error("invalid consensus requirements: {0}")]
    InvalidRequirements(String),

    #[error("unknown verification status: {0}")]
    UnknownStatus(String),

    #[error("unknown verification kind: {0}")]
    UnknownKind(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
