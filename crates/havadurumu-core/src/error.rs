//! Centralized error types for the Havadurumu application.
//!
//! Startup and configuration failures are typed here. Service crates keep
//! their own error enums and convert at the UI boundary.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for showing the user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service-level errors mapped from the UI crate.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => {
                "API_KEY could not be loaded. Add API_KEY to your .env file."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err = ConfigError::MissingSetting("API_KEY".into());
        let app_err: AppError = err.into();
        assert!(matches!(
            app_err,
            AppError::Config(ConfigError::MissingSetting(ref k)) if k == "API_KEY"
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Config(ConfigError::MissingSetting("API_KEY".into()));
        assert!(app_err.user_message().contains("API_KEY"));
    }

    #[test]
    fn test_display_includes_setting_name() {
        let err = ConfigError::MissingSetting("API_KEY".into());
        assert_eq!(err.to_string(), "Missing required setting: API_KEY");
    }
}
