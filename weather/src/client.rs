//! HTTP client for the weather-station network API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::mpsc;

use attest_types::{NetworkId, Timestamp};

use crate::config::WeatherConfig;
use crate::error::WeatherError;
use crate::types::{Sourced, StationLocation, WeatherData, WeatherStation};

/// Number of placeholder stations returned by a synthetic station lookup.
const SYNTHETIC_STATION_COUNT: usize = 5;

#[derive(Debug, Default, Deserialize)]
struct RawWind {
    speed: Option<f64>,
    direction: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLocation {
    lat: Option<f64>,
    lon: Option<f64>,
    name: Option<String>,
}

/// Upstream observation. Field names vary between API versions, so every
/// field is optional and aliases are resolved in [`RawWeather::into_data`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWeather {
    temperature: Option<f64>,
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    wind: Option<RawWind>,
    precipitation: Option<f64>,
    rain: Option<f64>,
    uv_index: Option<f64>,
    uv: Option<f64>,
    visibility: Option<f64>,
    /// Epoch milliseconds.
    timestamp: Option<u64>,
    location: Option<RawLocation>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl RawWeather {
    fn into_data(self) -> WeatherData {
        let wind = self.wind.unwrap_or_default();
        let location = self.location.unwrap_or_default();
        WeatherData {
            temperature: self.temperature.or(self.temp).unwrap_or(20.0),
            humidity: self.humidity.unwrap_or(50.0),
            pressure: self.pressure.unwrap_or(1013.0),
            wind_speed: self.wind_speed.or(wind.speed).unwrap_or(5.0),
            wind_direction: self.wind_direction.or(wind.direction).unwrap_or(180.0),
            precipitation: self.precipitation.or(self.rain).unwrap_or(0.0),
            uv_index: self.uv_index.or(self.uv).unwrap_or(5.0),
            visibility: self.visibility.unwrap_or(10.0),
            timestamp: self
                .timestamp
                .map(Timestamp::from_millis)
                .unwrap_or_else(Timestamp::now),
            location: StationLocation {
                latitude: location.lat.or(self.lat).unwrap_or(0.0),
                longitude: location.lon.or(self.lon).unwrap_or(0.0),
                name: location.name.unwrap_or_else(|| "Unknown Location".to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCoordinates {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStation {
    id: String,
    name: String,
    coordinates: RawCoordinates,
    #[serde(default)]
    elevation: f64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    last_update: Option<u64>,
}

/// Client for a weather-station network.
#[derive(Clone, Debug)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    network: NetworkId,
    synthetic_fallback: bool,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        config.validate()?;
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| WeatherError::Config(format!("invalid apiKey: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| WeatherError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            network: config.network,
            synthetic_fallback: config.synthetic_fallback,
        })
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn synthetic_fallback(&self) -> bool {
        self.synthetic_fallback
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    WeatherError::Unreachable(e.to_string())
                } else {
                    WeatherError::RequestFailed(e.to_string())
                }
            })?;
        if !response.status().is_success() {
            return Err(WeatherError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))
    }

    /// Wrap a live result, or fall back to `synthetic()` if allowed.
    fn sourced<T>(
        &self,
        what: &str,
        live: Result<T, WeatherError>,
        synthetic: impl FnOnce() -> T,
    ) -> Result<Sourced<T>, WeatherError> {
        match live {
            Ok(v) => Ok(Sourced::Live(v)),
            Err(e) if self.synthetic_fallback => {
                tracing::warn!("{what} failed, serving synthetic data: {e}");
                Ok(Sourced::Synthetic(synthetic()))
            }
            Err(e) => Err(e),
        }
    }

    /// Current conditions at a position.
    pub async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Sourced<WeatherData>, WeatherError> {
        check_coordinates(latitude, longitude)?;
        let live = self
            .get_json::<RawWeather>(
                "/weather/current",
                &[("lat", latitude.to_string()), ("lon", longitude.to_string())],
            )
            .await
            .map(RawWeather::into_data);
        self.sourced("current weather", live, || {
            synthetic_weather(latitude, longitude, Timestamp::now())
        })
    }

    /// Daily forecast for the next `days` days.
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u32,
    ) -> Result<Sourced<Vec<WeatherData>>, WeatherError> {
        check_coordinates(latitude, longitude)?;
        let live = self
            .get_json::<Vec<RawWeather>>(
                "/weather/forecast",
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await
            .map(|items| items.into_iter().map(RawWeather::into_data).collect());
        self.sourced("weather forecast", live, || {
            let now = Timestamp::now().as_secs();
            (0..days as u64)
                .map(|d| synthetic_weather(latitude, longitude, Timestamp::new(now + d * 86_400)))
                .collect()
        })
    }

    /// Stations within `radius_km` of a position.
    pub async fn nearby_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Sourced<Vec<WeatherStation>>, WeatherError> {
        check_coordinates(latitude, longitude)?;
        let live = self
            .get_json::<Vec<RawStation>>(
                "/stations/nearby",
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("radius", radius_km.to_string()),
                ],
            )
            .await
            .map(|items| {
                items
                    .into_iter()
                    .map(|s| WeatherStation {
                        id: s.id,
                        name: s.name,
                        latitude: s.coordinates.lat,
                        longitude: s.coordinates.lon,
                        elevation: s.elevation,
                        is_active: s.status == "active",
                        last_update: s
                            .last_update
                            .map(Timestamp::from_millis)
                            .unwrap_or(Timestamp::EPOCH),
                    })
                    .collect()
            });
        self.sourced("nearby stations", live, || {
            synthetic_stations(latitude, longitude)
        })
    }

    /// Observations between `start` and `end`.
    pub async fn historical(
        &self,
        latitude: f64,
        longitude: f64,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Sourced<Vec<WeatherData>>, WeatherError> {
        check_coordinates(latitude, longitude)?;
        if end < start {
            return Err(WeatherError::InvalidRange(format!(
                "history range ends ({end}) before it starts ({start})"
            )));
        }
        let live = self
            .get_json::<Vec<RawWeather>>(
                "/weather/historical",
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("start", start.as_secs().to_string()),
                    ("end", end.as_secs().to_string()),
                ],
            )
            .await
            .map(|items| items.into_iter().map(RawWeather::into_data).collect());
        self.sourced("historical weather", live, Vec::new)
    }

    /// Poll current conditions every `every` and push them to the returned
    /// channel. The background task stops when the receiver is dropped.
    pub fn subscribe(
        self: &Arc<Self>,
        latitude: f64,
        longitude: f64,
        every: Duration,
    ) -> mpsc::Receiver<Result<Sourced<WeatherData>, WeatherError>> {
        let (tx, rx) = mpsc::channel(8);
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let update = client.current_weather(latitude, longitude).await;
                if tx.send(update).await.is_err() {
                    tracing::debug!("weather subscriber dropped, stopping updates");
                    break;
                }
            }
        });
        rx
    }
}

fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(WeatherError::InvalidCoordinates(format!(
            "latitude {latitude} outside [-90, 90]"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(WeatherError::InvalidCoordinates(format!(
            "longitude {longitude} outside [-180, 180]"
        )));
    }
    Ok(())
}

/// Mid-range placeholder conditions. Deterministic for a given position and time.
fn synthetic_weather(latitude: f64, longitude: f64, at: Timestamp) -> WeatherData {
    WeatherData {
        temperature: 20.0,
        humidity: 50.0,
        pressure: 1013.0,
        wind_speed: 5.0,
        wind_direction: 180.0,
        precipitation: 0.0,
        uv_index: 5.0,
        visibility: 10.0,
        timestamp: at,
        location: StationLocation {
            latitude,
            longitude,
            name: format!("Location {latitude:.2}, {longitude:.2}"),
        },
    }
}

fn synthetic_stations(latitude: f64, longitude: f64) -> Vec<WeatherStation> {
    (0..SYNTHETIC_STATION_COUNT)
        .map(|i| {
            let offset = (i as f64 - 2.0) * 0.01;
            WeatherStation {
                id: format!("station_{}", i + 1),
                name: format!("Weather Station {}", i + 1),
                latitude: (latitude + offset).clamp(-90.0, 90.0),
                longitude: (longitude - offset).clamp(-180.0, 180.0),
                elevation: 0.0,
                is_active: true,
                last_update: Timestamp::now(),
            }
        })
        .collect()
}
