//! Fundamental types for the attest workspace.
//!
//! This crate defines the data model shared by every integration crate:
//! network identifiers, timestamps, verification requests and results, and
//! the validator-network health snapshot.

pub mod error;
pub mod network;
pub mod request;
pub mod requirements;
pub mod result;
pub mod time;

pub use error::TypesError;
pub use network::NetworkId;
pub use request::{VerificationKind, VerificationRequest};
pub use requirements::ConsensusRequirements;
pub use result::{EvidenceEntry, NetworkStatus, VerificationResult, VerificationStatus};
pub use time::Timestamp;
