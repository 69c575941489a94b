use std::sync::Arc;

use crate::{AppError, Config};

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Create a new application instance from `.env` and `havadurumu.toml`.
    ///
    /// # Errors
    ///
    /// Fails when the API key is missing or the overrides file is invalid.
    pub fn new() -> Result<Self, AppError> {
        let config = Config::load()?;
        Ok(Self::from_config(config))
    }

    /// Create an application instance around an already-built config.
    pub fn from_config(config: Config) -> Self {
        tracing::info!(
            "Application configured (settings: {}, log: {})",
            config.storage.settings_path.display(),
            config.storage.log_path.display()
        );
        Self {
            config: Arc::new(config),
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the config for services that outlive a borrow
    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down application");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_keeps_settings() {
        let app = App::from_config(Config::with_api_key("key"));
        assert_eq!(app.config().api_key, "key");
        assert_eq!(app.shared_config().ui.auto_refresh_secs, 30);
    }
}
