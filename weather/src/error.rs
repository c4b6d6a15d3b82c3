use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather config error: {0}")]
    Config(String),

    #[error("weather API unreachable: {0}")]
    Unreachable(String),

    #[error("weather API request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from weather API: {0}")]
    InvalidResponse(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("invalid time range: {0}")]
    InvalidRange(String),
}
