//! OpenWeatherMap client: current conditions, 5-day forecast, and icons.

use std::time::Duration;

use chrono::Local;
use reqwest::{Client, Response};
use tracing::instrument;

use crate::resolver::normalize_city_name;
use crate::types::{
    ApiCurrentResponse, ApiErrorResponse, ApiForecastResponse, Forecast, WeatherError,
    WeatherSnapshot, LOOKUP_FALLBACK_MESSAGE,
};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Everything the client needs, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct WeatherClientConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub icon_base_url: String,
    pub language: String,
    pub units: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    config: WeatherClientConfig,
}

impl WeatherClient {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(config: WeatherClientConfig) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn get_city(&self, endpoint: &str, city: &str) -> Result<Response, WeatherError> {
        let url = format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            endpoint
        );
        let query = normalize_city_name(city);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("lang", self.config.language.as_str()),
                ("units", self.config.units.as_str()),
            ])
            .send()
            .await?;

        Ok(response)
    }

    /// Fetch current conditions for a city.
    ///
    /// # Errors
    ///
    /// `Lookup` with the provider's message on a non-success status,
    /// `Network`/`Parse` on transport or body failures.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let response = self.get_city("weather", city).await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| LOOKUP_FALLBACK_MESSAGE.to_string());
            tracing::debug!("Current weather lookup failed with {}: {}", status, message);
            return Err(WeatherError::Lookup(message));
        }

        let body: ApiCurrentResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e.without_url())))?;

        let weather = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("response has no weather entry".into()))?;

        Ok(WeatherSnapshot {
            city: body.name,
            temperature_c: body.main.temp,
            description: weather.description,
            icon_code: weather.icon.unwrap_or_default(),
        })
    }

    /// Fetch the 3-hour feed and sample one slot per day.
    ///
    /// # Errors
    ///
    /// `ForecastUnavailable` on a non-success status.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let response = self.get_city("forecast", city).await?;

        if !response.status().is_success() {
            tracing::debug!("Forecast lookup failed with {}", response.status());
            return Err(WeatherError::ForecastUnavailable);
        }

        let body: ApiForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e.without_url())))?;

        Forecast::from_feed(&body.list, &Local)
    }

    /// Download the `@2x` PNG for an icon code.
    ///
    /// # Errors
    ///
    /// `Icon` when the status is not success or the body is not a PNG.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_icon(&self, icon_code: &str) -> Result<Vec<u8>, WeatherError> {
        if icon_code.is_empty() {
            return Err(WeatherError::Icon("empty icon code".into()));
        }

        let url = format!(
            "{}/{}@2x.png",
            self.config.icon_base_url.trim_end_matches('/'),
            icon_code
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(WeatherError::Icon(format!("status {}", response.status())));
        }

        let bytes = response.bytes().await?;
        if !bytes.starts_with(PNG_SIGNATURE) {
            return Err(WeatherError::Icon("body is not a PNG image".into()));
        }

        Ok(bytes.to_vec())
    }
}
