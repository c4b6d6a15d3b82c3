//! Weather integration configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use attest_types::NetworkId;

use crate::error::WeatherError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Root URL of the weather API, e.g. `https://api.weatherxm.com/api/v1`.
    pub base_url: String,

    #[serde(default)]
    pub network: NetworkId,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Serve placeholder data, marked [`Sourced::Synthetic`](crate::Sourced), when the API fails.
    #[serde(default)]
    pub synthetic_fallback: bool,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl WeatherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            network: NetworkId::default(),
            request_timeout_secs: default_request_timeout_secs(),
            synthetic_fallback: false,
        }
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.base_url.trim().is_empty() {
            return Err(WeatherError::Config("baseUrl must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
