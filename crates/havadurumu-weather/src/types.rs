use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Shown when the provider rejects a lookup without a message of its own.
pub const LOOKUP_FALLBACK_MESSAGE: &str = "Şehir bulunamadı";

/// Forecast slots per day in the 3-hour feed.
pub const SLOTS_PER_DAY: usize = 8;

/// One point-in-time weather reading for a city.
///
/// Field names on the wire match the lookup log format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "sehir")]
    pub city: String,
    #[serde(rename = "sicaklik")]
    pub temperature_c: Temperature,
    #[serde(rename = "durum")]
    pub description: String,
    #[serde(rename = "ikon")]
    pub icon_code: String,
}

impl WeatherSnapshot {
    /// Three-line summary: city, capitalized description, temperature.
    pub fn summary(&self) -> String {
        format!(
            "{}\n{}\n{}°C",
            self.city,
            capitalize(&self.description),
            self.temperature_c
        )
    }
}

/// Temperature exactly as the provider sent it: `20` stays `20` and `21.5`
/// stays `21.5`, both on screen and in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(serde_json::Number);

impl Temperature {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or_default()
    }
}

impl From<i64> for Temperature {
    fn from(value: i64) -> Self {
        Self(value.into())
    }
}

/// Non-finite values have no JSON form and become `0`.
impl From<f64> for Temperature {
    fn from(value: f64) -> Self {
        Self(serde_json::Number::from_f64(value).unwrap_or_else(|| 0.into()))
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// One sampled day of the forecast feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    /// `DD.MM` in local time
    pub date_label: String,
    pub description: String,
    pub temperature_c: Temperature,
}

impl ForecastEntry {
    /// `"DD.MM: Description - X°C"`
    pub fn display_line(&self) -> String {
        format!(
            "{}: {} - {}°C",
            self.date_label,
            capitalize(&self.description),
            self.temperature_c
        )
    }
}

/// Daily samples of the 5-day forecast, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    /// Sample every 8th slot of a 3-hour feed, labelling dates in `tz`.
    ///
    /// # Errors
    ///
    /// Fails if a sampled slot has no weather description or an out-of-range
    /// timestamp.
    pub fn from_feed<Tz>(items: &[ApiForecastItem], tz: &Tz) -> Result<Self, WeatherError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let entries = items
            .iter()
            .step_by(SLOTS_PER_DAY)
            .map(|item| {
                let date = DateTime::from_timestamp(item.dt, 0)
                    .ok_or_else(|| WeatherError::Parse(format!("invalid timestamp {}", item.dt)))?
                    .with_timezone(tz);
                let description = item
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .ok_or_else(|| WeatherError::Parse("forecast slot without weather".into()))?;

                Ok(ForecastEntry {
                    date_label: date.format("%d.%m").to_string(),
                    description,
                    temperature_c: item.main.temp.clone(),
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Display lines, one per day
    pub fn display_lines(&self) -> Vec<String> {
        self.entries.iter().map(ForecastEntry::display_line).collect()
    }

    /// (date label, temperature) pairs for charting
    pub fn chart_points(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .map(|e| (e.date_label.clone(), e.temperature_c.as_f64()))
            .collect()
    }
}

/// Provider JSON: current conditions
#[derive(Debug, Deserialize)]
pub struct ApiCurrentResponse {
    pub name: String,
    pub main: ApiMain,
    pub weather: Vec<ApiWeather>,
}

/// Provider JSON: forecast feed
#[derive(Debug, Deserialize)]
pub struct ApiForecastResponse {
    pub list: Vec<ApiForecastItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiForecastItem {
    /// Unix seconds
    pub dt: i64,
    pub main: ApiMain,
    pub weather: Vec<ApiWeather>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMain {
    pub temp: Temperature,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiWeather {
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Provider JSON: error body
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub message: Option<String>,
}

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Geolocation errors. Always recovered by falling back to a default city.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Geolocation request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Geolocation service returned status {0}")]
    Status(u16),
    #[error("Geolocation response could not be parsed: {0}")]
    Parse(String),
    #[error("Geolocation response has no city")]
    CityMissing,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Transport failure. Never carries the request URL, which holds the API key.
    #[error("{0}")]
    Network(reqwest::Error),
    /// Provider rejected the lookup; carries its message verbatim.
    #[error("{0}")]
    Lookup(String),
    #[error("Haftalık tahmin alınamadı")]
    ForecastUnavailable,
    #[error("Unexpected response: {0}")]
    Parse(String),
    #[error("Icon unavailable: {0}")]
    Icon(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn slot(dt: i64, temp: f64, description: &str) -> ApiForecastItem {
        ApiForecastItem {
            dt,
            main: ApiMain { temp: temp.into() },
            weather: vec![ApiWeather {
                description: description.to_string(),
                icon: None,
            }],
        }
    }

    fn feed(n: usize) -> Vec<ApiForecastItem> {
        // 2024-06-01T00:00:00Z, 3-hour steps
        (0..n)
            .map(|i| slot(1_717_200_000 + (i as i64) * 3 * 3600, i as f64, "açık"))
            .collect()
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("açık"), "Açık");
        assert_eq!(capitalize("parçalı BULUTLU"), "Parçalı bulutlu");
        assert_eq!(capitalize("çok bulutlu"), "Çok bulutlu");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_temperature_keeps_provider_form() {
        let parsed: ApiMain = serde_json::from_str(r#"{"temp": 20}"#).unwrap();
        assert_eq!(parsed.temp.to_string(), "20");
        assert_eq!(parsed.temp.as_f64(), 20.0);

        let parsed: ApiMain = serde_json::from_str(r#"{"temp": 21.5}"#).unwrap();
        assert_eq!(parsed.temp.to_string(), "21.5");

        let parsed: ApiMain = serde_json::from_str(r#"{"temp": -3}"#).unwrap();
        assert_eq!(parsed.temp.to_string(), "-3");

        assert_eq!(Temperature::from(20.0).to_string(), "20.0");
        assert_eq!(Temperature::from(f64::NAN).to_string(), "0");
    }

    #[test]
    fn test_snapshot_summary() {
        let snapshot = WeatherSnapshot {
            city: "Ankara".into(),
            temperature_c: 21.5_f64.into(),
            description: "açık".into(),
            icon_code: "01d".into(),
        };
        assert_eq!(snapshot.summary(), "Ankara\nAçık\n21.5°C");

        let whole = WeatherSnapshot {
            temperature_c: 20_i64.into(),
            ..snapshot
        };
        assert_eq!(whole.summary(), "Ankara\nAçık\n20°C");
    }

    #[test]
    fn test_snapshot_log_field_names() {
        let snapshot = WeatherSnapshot {
            city: "İzmir".into(),
            temperature_c: 20.0_f64.into(),
            description: "kapalı".into(),
            icon_code: "04n".into(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"sehir":"İzmir","sicaklik":20.0,"durum":"kapalı","ikon":"04n"}"#
        );
    }

    #[test]
    fn test_sampling_count_is_ceil_of_n_over_8() {
        for n in [0usize, 1, 7, 8, 9, 16, 39, 40] {
            let forecast = Forecast::from_feed(&feed(n), &Utc).unwrap();
            assert_eq!(forecast.len(), n.div_ceil(SLOTS_PER_DAY), "n = {}", n);
        }
    }

    #[test]
    fn test_sampling_picks_every_eighth_slot() {
        let forecast = Forecast::from_feed(&feed(40), &Utc).unwrap();
        let temps: Vec<f64> = forecast.entries.iter().map(|e| e.temperature_c.as_f64()).collect();
        assert_eq!(temps, vec![0.0, 8.0, 16.0, 24.0, 32.0]);

        let labels: Vec<&str> = forecast.entries.iter().map(|e| e.date_label.as_str()).collect();
        assert_eq!(labels, vec!["01.06", "02.06", "03.06", "04.06", "05.06"]);
    }

    #[test]
    fn test_display_line_format() {
        let forecast = Forecast::from_feed(&[slot(1_717_243_200, 18.0, "hafif yağmur")], &Utc).unwrap();
        assert_eq!(forecast.display_lines(), vec!["01.06: Hafif yağmur - 18.0°C"]);
        assert_eq!(forecast.chart_points(), vec![("01.06".to_string(), 18.0)]);
    }

    #[test]
    fn test_slot_without_weather_is_parse_error() {
        let mut items = feed(1);
        items[0].weather.clear();
        let result = Forecast::from_feed(&items, &Utc);
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }

    #[test]
    fn test_lookup_error_displays_provider_message() {
        let err = WeatherError::Lookup("city not found".into());
        assert_eq!(err.to_string(), "city not found");
        assert_eq!(
            WeatherError::ForecastUnavailable.to_string(),
            "Haftalık tahmin alınamadı"
        );
    }
}
