use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required key is missing or a value has the wrong shape.
    #[error("integration {name} is misconfigured: {reason}")]
    Configuration { name: String, reason: String },

    /// The configuration parsed but the client could not be brought up.
    #[error("integration {name} failed to set up: {reason}")]
    Setup { name: String, reason: String },

    #[error("unknown integration: {0}")]
    UnknownIntegration(String),

    /// The registry configuration file itself could not be loaded.
    #[error("registry config error: {0}")]
    Config(String),
}
