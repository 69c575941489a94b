pub mod bridge;
pub mod models;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use cxx_qt_lib::{QGuiApplication, QQmlApplicationEngine, QUrl};
use havadurumu_core::Config;

pub use models::weather_model::qobject::WeatherModel;

const MAIN_QML: &str = "qrc:/qt/qml/havadurumu_ui/qml/main.qml";

/// Build the weather services and run the Qt event loop until the window
/// closes. Returns the event loop's exit code.
///
/// # Errors
///
/// Fails if the services cannot be built or Qt cannot be started.
pub fn run(config: Arc<Config>) -> Result<i32> {
    bridge::initialize_weather_services(&config)?;

    let mut app = QGuiApplication::new();
    let mut engine = QQmlApplicationEngine::new();

    if let Some(engine) = engine.as_mut() {
        engine.load(&QUrl::from(MAIN_QML));
    }

    let exit_code = match app.as_mut() {
        Some(app) => app.exec(),
        None => anyhow::bail!("Failed to create Qt application"),
    };

    tracing::info!("Event loop exited with code {}", exit_code);
    Ok(exit_code)
}
