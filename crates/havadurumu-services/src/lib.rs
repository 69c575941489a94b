//! Local persistence and the refresh workflow behind the weather window.

pub mod auto_refresh;
pub mod chart;
pub mod error;
pub mod refresh;
pub mod settings;
pub mod weather_log;

pub use auto_refresh::AutoRefresh;
pub use chart::ChartSeries;
pub use error::{RefreshError, StoreError};
pub use refresh::{RefreshEvent, RefreshMachine, RefreshPipeline, RefreshState};
pub use settings::{Palette, Settings, SettingsStore, Theme};
pub use weather_log::WeatherLog;
