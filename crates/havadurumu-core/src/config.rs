use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the weather provider API key.
pub const API_KEY_VAR: &str = "API_KEY";

/// Optional overrides file, looked up in the working directory.
pub const CONFIG_FILE: &str = "havadurumu.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Weather provider API key. Never read from the overrides file.
    #[serde(skip)]
    pub api_key: String,

    /// Provider endpoints and request parameters
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Local file locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// UI behaviour
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL of the current-weather and forecast endpoints
    pub api_base_url: String,

    /// Base URL of the condition icon images
    pub icon_base_url: String,

    /// IP geolocation endpoint used when no city is typed
    pub geolocation_url: String,

    /// Language passed to the provider (`lang`)
    pub language: String,

    /// Unit system passed to the provider (`units`)
    pub units: String,

    /// City used when geolocation fails
    pub fallback_city: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            icon_base_url: "http://openweathermap.org/img/wn".to_string(),
            geolocation_url: "https://ipinfo.io/json".to_string(),
            language: "tr".to_string(),
            units: "metric".to_string(),
            fallback_city: "Istanbul".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Theme preference file
    pub settings_path: PathBuf,

    /// Append-only lookup log
    pub log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("settings.json"),
            log_path: PathBuf::from("hava_durumu_log.txt"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Auto-refresh period in seconds
    pub auto_refresh_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_refresh_secs: 30,
        }
    }
}

impl Config {
    /// Build a config with defaults for everything but the API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            ui: UiConfig::default(),
        }
    }

    /// Load `.env`, read the API key, and apply `havadurumu.toml` if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSetting` when the API key is absent, and
    /// `ParseError`/`Invalid` when the overrides file is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) => tracing::debug!("No .env file loaded: {}", e),
        }

        let api_key = std::env::var(API_KEY_VAR).ok();
        Self::load_from(Path::new(CONFIG_FILE), api_key)
    }

    /// Load configuration from an explicit overrides path and API key.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path, api_key: Option<String>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingSetting(API_KEY_VAR.to_string()))?;

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            toml::from_str::<Config>(&contents)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?
        } else {
            Self::with_api_key(String::new())
        };
        config.api_key = api_key;

        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(&self.weather.icon_base_url, "weather.icon_base_url", &mut result);
        self.validate_url(
            &self.weather.geolocation_url,
            "weather.geolocation_url",
            &mut result,
        );

        if self.weather.fallback_city.trim().is_empty() {
            result.add_error("weather.fallback_city", "Fallback city cannot be empty");
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.ui.auto_refresh_secs == 0 {
            result.add_error("ui.auto_refresh_secs", "Auto-refresh period must be greater than 0");
        } else if self.ui.auto_refresh_secs < 10 {
            result.add_warning(
                "ui.auto_refresh_secs",
                "Auto-refresh period under 10 seconds may hit provider rate limits",
            );
        }

        if self.weather.language != "tr" {
            result.add_warning(
                "weather.language",
                "UI strings are Turkish; provider descriptions will not match",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::with_api_key("key");
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join(CONFIG_FILE), None);
        assert!(matches!(result, Err(ConfigError::MissingSetting(ref k)) if k == API_KEY_VAR));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join(CONFIG_FILE), Some("   ".into()));
        assert!(matches!(result, Err(ConfigError::MissingSetting(_))));
    }

    #[test]
    fn test_defaults_without_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE), Some("abc".into())).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.weather.language, "tr");
        assert_eq!(config.weather.units, "metric");
        assert_eq!(config.weather.fallback_city, "Istanbul");
        assert_eq!(config.ui.auto_refresh_secs, 30);
        assert_eq!(config.storage.settings_path, PathBuf::from("settings.json"));
        assert_eq!(config.storage.log_path, PathBuf::from("hava_durumu_log.txt"));
    }

    #[test]
    fn test_overrides_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[weather]\nfallback_city = \"Ankara\"\n\n[ui]\nauto_refresh_secs = 60\n",
        )
        .unwrap();

        let config = Config::load_from(&path, Some("abc".into())).unwrap();
        assert_eq!(config.weather.fallback_city, "Ankara");
        assert_eq!(config.ui.auto_refresh_secs, 60);
        // Untouched sections keep their defaults
        assert_eq!(config.weather.language, "tr");
        assert_eq!(config.storage.log_path, PathBuf::from("hava_durumu_log.txt"));
    }

    #[test]
    fn test_malformed_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[weather\nbroken").unwrap();

        let result = Config::load_from(&path, Some("abc".into()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::with_api_key("key");
        config.weather.api_base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_refresh_period_is_error() {
        let mut config = Config::with_api_key("key");
        config.ui.auto_refresh_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "ui.auto_refresh_secs"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
