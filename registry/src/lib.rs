//! Registry of external-service integrations.
//!
//! Each configured integration is built independently; one that fails to
//! configure or set up is left out and reported, never fatal to the rest.

pub mod config;
pub mod error;
pub mod registry;

pub use config::{IntegrationConfigs, RegistryConfig};
pub use error::RegistryError;
pub use registry::{
    EntryOutcome, InitReport, Integration, IntegrationKind, IntegrationRegistry, RegistryState,
};
