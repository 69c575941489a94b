//! Errors from the local settings and log files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Anything that aborts a refresh. Displays as the underlying message.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Weather(#[from] havadurumu_weather::WeatherError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
