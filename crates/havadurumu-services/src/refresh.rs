//! The refresh action and the window state machine around it.
//!
//! `RefreshPipeline::run` performs one refresh and reports progress as a
//! sequence of `RefreshEvent`s, so the UI can update each label as soon as
//! its data arrives. A failure ends the sequence with `Failed`; whatever was
//! already reported stays on screen.

use havadurumu_weather::{CityResolver, Forecast, WeatherClient, WeatherSnapshot};

use crate::error::RefreshError;
use crate::weather_log::WeatherLog;

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshEvent {
    /// Input was blank and this city was detected (or fell back to default)
    CityResolved(String),
    Current(WeatherSnapshot),
    /// PNG bytes, or `None` to clear the icon
    Icon(Option<Vec<u8>>),
    Forecast(Forecast),
    Failed(String),
    Completed,
}

pub struct RefreshPipeline {
    client: WeatherClient,
    resolver: CityResolver,
    log: WeatherLog,
}

impl RefreshPipeline {
    pub fn new(client: WeatherClient, resolver: CityResolver, log: WeatherLog) -> Self {
        Self {
            client,
            resolver,
            log,
        }
    }

    /// Run one refresh for the typed `input`, emitting events in order.
    /// Always ends with exactly one `Completed` or `Failed`.
    pub async fn run<F>(&self, input: &str, mut emit: F)
    where
        F: FnMut(RefreshEvent),
    {
        match self.run_steps(input, &mut emit).await {
            Ok(()) => emit(RefreshEvent::Completed),
            Err(e) => {
                tracing::warn!("Refresh failed: {}", e);
                emit(RefreshEvent::Failed(e.to_string()));
            }
        }
    }

    async fn run_steps<F>(&self, input: &str, emit: &mut F) -> Result<(), RefreshError>
    where
        F: FnMut(RefreshEvent),
    {
        let city = self.resolver.resolve(input).await;
        if input.trim().is_empty() {
            emit(RefreshEvent::CityResolved(city.clone()));
        }

        let snapshot = self.client.fetch_current(&city).await?;
        tracing::info!(
            "Current weather for {}: {}°C, {}",
            snapshot.city,
            snapshot.temperature_c,
            snapshot.description
        );
        emit(RefreshEvent::Current(snapshot.clone()));

        let icon = match self.client.fetch_icon(&snapshot.icon_code).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!("Clearing icon: {}", e);
                None
            }
        };
        emit(RefreshEvent::Icon(icon));

        let forecast = self.client.fetch_forecast(&city).await?;
        emit(RefreshEvent::Forecast(forecast));

        self.log.append(&snapshot)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Fetching,
    Displaying,
    Error,
}

#[derive(Debug, Default)]
pub struct RefreshMachine {
    state: RefreshState,
    has_data: bool,
}

impl RefreshMachine {
    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == RefreshState::Fetching
    }

    /// True once any current-weather result has been shown.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Enter `Fetching`. Returns false if a refresh is already running.
    pub fn begin(&mut self) -> bool {
        if self.is_fetching() {
            return false;
        }
        self.state = RefreshState::Fetching;
        true
    }

    pub fn apply(&mut self, event: &RefreshEvent) {
        match event {
            RefreshEvent::Current(_) => self.has_data = true,
            RefreshEvent::Failed(_) => self.state = RefreshState::Error,
            RefreshEvent::Completed => self.state = RefreshState::Displaying,
            RefreshEvent::CityResolved(_) | RefreshEvent::Icon(_) | RefreshEvent::Forecast(_) => {}
        }
    }

    /// Error dialog dismissed.
    pub fn acknowledge_error(&mut self) {
        if self.state == RefreshState::Error {
            self.state = if self.has_data {
                RefreshState::Displaying
            } else {
                RefreshState::Idle
            };
        }
    }
}
