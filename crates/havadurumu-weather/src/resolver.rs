//! City resolution: normalize typed names, or infer a city from the caller's
//! public IP when nothing was typed.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::types::LocationError;

const USER_AGENT: &str = "Havadurumu/0.1.0";

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
}

/// Trim, lowercase, and fold Turkish diacritics to ASCII.
pub fn normalize_city_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ç' => 'c',
            'ş' => 's',
            'ğ' => 'g',
            'ü' => 'u',
            'ö' => 'o',
            'ı' => 'i',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CityResolver {
    client: Client,
    geolocation_url: String,
    fallback_city: String,
}

impl CityResolver {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(
        geolocation_url: impl Into<String>,
        fallback_city: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            geolocation_url: geolocation_url.into(),
            fallback_city: fallback_city.into(),
        })
    }

    pub fn fallback_city(&self) -> &str {
        &self.fallback_city
    }

    /// Ask the geolocation service which city the caller is in.
    ///
    /// # Errors
    ///
    /// Network failure, non-success status, unparseable body, or a missing
    /// or empty `city` field.
    pub async fn detect_city(&self) -> Result<String, LocationError> {
        let response = self.client.get(&self.geolocation_url).send().await?;

        if !response.status().is_success() {
            return Err(LocationError::Status(response.status().as_u16()));
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Parse(e.to_string()))?;

        body.city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LocationError::CityMissing)
    }

    /// Return the typed city, or the detected one when input is blank.
    /// Detection failures fall back to the configured default city.
    pub async fn resolve(&self, input: &str) -> String {
        let typed = input.trim();
        if !typed.is_empty() {
            return typed.to_string();
        }

        match self.detect_city().await {
            Ok(city) => {
                tracing::info!("Detected city from IP: {}", city);
                city
            }
            Err(e) => {
                tracing::warn!("City detection failed ({}), using {}", e, self.fallback_city);
                self.fallback_city.clone()
            }
        }
    }
}
