//! Weather data types.

use serde::{Deserialize, Serialize};

use attest_types::Timestamp;

/// A value tagged with its provenance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum Sourced<T> {
    /// Returned by the upstream API.
    Live(T),
    /// Placeholder produced locally because the API call failed.
    Synthetic(T),
}

impl<T> Sourced<T> {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Self::Live(v) | Self::Synthetic(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Live(v) | Self::Synthetic(v) => v,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// One weather observation or forecast point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// hPa.
    pub pressure: f64,
    /// m/s.
    pub wind_speed: f64,
    /// Degrees from north.
    pub wind_direction: f64,
    /// mm.
    pub precipitation: f64,
    pub uv_index: f64,
    /// km.
    pub visibility: f64,
    pub timestamp: Timestamp,
    pub location: StationLocation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherStation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub elevation: f64,
    pub is_active: bool,
    pub last_update: Timestamp,
}
