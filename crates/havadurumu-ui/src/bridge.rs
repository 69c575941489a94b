use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use havadurumu_core::Config;
use havadurumu_services::{RefreshPipeline, SettingsStore, WeatherLog};
use havadurumu_weather::{CityResolver, WeatherClient, WeatherClientConfig};
use parking_lot::Mutex;

use crate::services::WeatherServiceMessage;

// Static tokio runtime that lives for the duration of the application
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

static WEATHER_SERVICES: OnceLock<WeatherServices> = OnceLock::new();

// Weather service channel
static WEATHER_SERVICE_TX: OnceLock<Sender<WeatherServiceMessage>> = OnceLock::new();
static WEATHER_SERVICE_RX: OnceLock<Mutex<Receiver<WeatherServiceMessage>>> = OnceLock::new();

/// Everything a `WeatherModel` needs, shared by all instances.
#[derive(Clone)]
pub struct WeatherServices {
    pub pipeline: Arc<RefreshPipeline>,
    pub settings: Arc<SettingsStore>,
    pub auto_refresh_period: Duration,
}

fn get_or_init_runtime() -> Result<tokio::runtime::Handle> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime.handle().clone());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("havadurumu-tokio")
        .build()
        .context("Failed to create tokio runtime")?;

    // Lost race: the other runtime wins and ours is dropped here
    let _ = RUNTIME.set(runtime);
    get_runtime().context("Tokio runtime not available")
}

fn build_services(config: &Config) -> Result<WeatherServices> {
    let weather = &config.weather;
    let timeout = Duration::from_secs(weather.request_timeout_secs);

    let client = WeatherClient::new(WeatherClientConfig {
        api_key: config.api_key.clone(),
        api_base_url: weather.api_base_url.clone(),
        icon_base_url: weather.icon_base_url.clone(),
        language: weather.language.clone(),
        units: weather.units.clone(),
        timeout,
    })
    .context("Failed to create weather client")?;

    let resolver = CityResolver::new(
        weather.geolocation_url.clone(),
        weather.fallback_city.clone(),
        timeout,
    )
    .context("Failed to create city resolver")?;

    let log = WeatherLog::new(&config.storage.log_path);

    Ok(WeatherServices {
        pipeline: Arc::new(RefreshPipeline::new(client, resolver, log)),
        settings: Arc::new(SettingsStore::new(&config.storage.settings_path)),
        auto_refresh_period: Duration::from_secs(config.ui.auto_refresh_secs),
    })
}

/// Initialize the runtime and weather services.
/// Must be called before QML creates a WeatherModel.
pub fn initialize_weather_services(config: &Config) -> Result<()> {
    let _runtime = get_or_init_runtime()?;

    let services = build_services(config)?;
    if WEATHER_SERVICES.set(services).is_err() {
        tracing::warn!("Weather services already initialized");
    }

    init_weather_service_channel();

    tracing::info!(
        "Weather services initialized (log: {}, settings: {})",
        config.storage.log_path.display(),
        config.storage.settings_path.display()
    );
    Ok(())
}

/// Get the initialized weather services for use by WeatherModels
pub fn get_weather_services() -> Option<(WeatherServices, tokio::runtime::Handle)> {
    let services = WEATHER_SERVICES.get()?.clone();
    let runtime = RUNTIME.get()?.handle().clone();
    Some((services, runtime))
}

pub fn get_runtime() -> Option<tokio::runtime::Handle> {
    RUNTIME.get().map(|r| r.handle().clone())
}

/// Create the weather service channel. Safe to call more than once.
pub fn init_weather_service_channel() -> bool {
    if WEATHER_SERVICE_TX.get().is_some() {
        return true;
    }
    let (tx, rx) = std::sync::mpsc::channel();
    WEATHER_SERVICE_TX.set(tx).ok();
    WEATHER_SERVICE_RX.set(Mutex::new(rx)).ok();
    true
}

/// Sender for request_* calls. None if the channel was not created yet.
pub fn get_weather_service_tx() -> Option<Sender<WeatherServiceMessage>> {
    WEATHER_SERVICE_TX.get().cloned()
}

/// Non-blocking recv from the weather channel. Called by WeatherModel::poll_channel.
pub fn try_recv_weather_message() -> Option<WeatherServiceMessage> {
    let rx = WEATHER_SERVICE_RX.get()?;
    rx.lock().try_recv().ok()
}
