//! Weather data for location-aware agents.
//!
//! Reads current conditions, forecasts, history and nearby stations from a
//! weather-station network API. When the API is unreachable the client can
//! substitute placeholder data, but only if the configuration opts in, and
//! every value says where it came from via [`Sourced`].

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::WeatherClient;
pub use config::WeatherConfig;
pub use error::WeatherError;
pub use types::{Sourced, StationLocation, WeatherData, WeatherStation};
