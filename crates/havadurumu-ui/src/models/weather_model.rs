use core::pin::Pin;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cxx_qt::CxxQtType;
use cxx_qt_lib::QString;
use havadurumu_services::{
    AutoRefresh, ChartSeries, RefreshEvent, RefreshMachine, Settings, Theme,
};

use crate::bridge::{self, WeatherServices};
use crate::services::{request_weather_refresh, weather_tick_sender, WeatherServiceMessage};

/// Horizontal gridlines drawn on the temperature chart.
const CHART_TICKS: usize = 5;

#[cxx_qt::bridge]
pub mod qobject {
    unsafe extern "C++" {
        include!("cxx-qt-lib/qstring.h");
        type QString = cxx_qt_lib::QString;
    }

    extern "RustQt" {
        #[qobject]
        #[qml_element]
        #[qproperty(bool, loading)]
        #[qproperty(QString, city_input)]
        #[qproperty(QString, result_text)]
        #[qproperty(QString, forecast_text)]
        #[qproperty(QString, icon_source)]
        #[qproperty(QString, error_message)]
        // Appearance
        #[qproperty(QString, theme)]
        #[qproperty(QString, window_color)]
        #[qproperty(QString, text_color)]
        #[qproperty(bool, auto_refresh)]
        type WeatherModel = super::WeatherModelRust;

        #[qinvokable]
        fn load_settings(self: Pin<&mut WeatherModel>);

        #[qinvokable]
        fn refresh(self: Pin<&mut WeatherModel>);

        #[qinvokable]
        fn select_theme(self: Pin<&mut WeatherModel>, theme: &QString);

        #[qinvokable]
        fn set_auto_refresh_enabled(self: Pin<&mut WeatherModel>, enabled: bool);

        #[qinvokable]
        fn acknowledge_error(self: Pin<&mut WeatherModel>);

        #[qinvokable]
        fn poll_channel(self: Pin<&mut WeatherModel>);

        #[qinvokable]
        fn chart_count(self: &WeatherModel) -> i32;

        #[qinvokable]
        fn chart_label(self: &WeatherModel, index: i32) -> QString;

        #[qinvokable]
        fn chart_x(self: &WeatherModel, index: i32) -> f64;

        #[qinvokable]
        fn chart_y(self: &WeatherModel, index: i32) -> f64;

        #[qinvokable]
        fn chart_tick_count(self: &WeatherModel) -> i32;

        #[qinvokable]
        fn chart_tick(self: &WeatherModel, index: i32) -> f64;

        #[qsignal]
        fn forecast_changed(self: Pin<&mut WeatherModel>);

        /// `error_message` holds the text to show
        #[qsignal]
        fn error_raised(self: Pin<&mut WeatherModel>);
    }
}

#[derive(Default)]
pub struct WeatherModelRust {
    loading: bool,
    city_input: QString,
    result_text: QString,
    forecast_text: QString,
    icon_source: QString,
    error_message: QString,
    theme: QString,
    window_color: QString,
    text_color: QString,
    auto_refresh: bool,
    // Internal state
    machine: RefreshMachine,
    chart: ChartSeries,
    timer: Option<AutoRefresh>,
    services: Option<WeatherServices>,
    runtime: Option<tokio::runtime::Handle>,
}

impl WeatherModelRust {
    fn ensure_initialized(&mut self) -> bool {
        if self.services.is_some() && self.runtime.is_some() {
            return true;
        }

        match bridge::get_weather_services() {
            Some((services, runtime)) => {
                self.services = Some(services);
                self.runtime = Some(runtime);
                tracing::info!("WeatherModel auto-initialized from global services");
                true
            }
            None => {
                tracing::error!("Cannot auto-initialize WeatherModel - global services not ready");
                false
            }
        }
    }

    /// Ticks already queued when auto-refresh was switched off are stale.
    fn accepts_tick(&self) -> bool {
        self.timer.as_ref().is_some_and(AutoRefresh::is_running)
    }

    fn chart_index(&self, index: i32) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.chart.len())
    }
}

fn icon_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

impl qobject::WeatherModel {
    /// Apply the saved theme. Called once when the window is created.
    pub fn load_settings(mut self: Pin<&mut Self>) {
        if !self.as_mut().rust_mut().ensure_initialized() {
            self.as_mut().report_error("Hava durumu servisi başlatılamadı".to_string());
            return;
        }

        let settings = match &self.as_ref().rust().services {
            Some(s) => s.settings.load(),
            None => return,
        };
        tracing::info!("Loaded theme preference: {}", settings.theme);
        self.as_mut().show_theme(settings.theme);
    }

    pub fn refresh(mut self: Pin<&mut Self>) {
        if !self.as_mut().rust_mut().ensure_initialized() {
            self.as_mut().report_error("Hava durumu servisi başlatılamadı".to_string());
            return;
        }

        let pipeline = match &self.as_ref().rust().services {
            Some(s) => s.pipeline.clone(),
            None => return,
        };

        bridge::init_weather_service_channel();
        let tx = match bridge::get_weather_service_tx() {
            Some(tx) => tx,
            None => return,
        };

        if !self.as_mut().rust_mut().machine.begin() {
            tracing::debug!("Refresh already running, trigger ignored");
            return;
        }

        let city_input = self.as_ref().rust().city_input.to_string();
        tracing::info!("Refreshing weather for {:?}", city_input);

        self.as_mut().set_loading(true);
        self.as_mut().set_error_message(QString::from(""));
        request_weather_refresh(&tx, pipeline, city_input);
    }

    /// Recolor the window and persist the choice.
    pub fn select_theme(mut self: Pin<&mut Self>, theme: &QString) {
        let name = theme.to_string();
        let theme = match Theme::parse(&name) {
            Some(t) => t,
            None => {
                tracing::warn!("Unknown theme {:?}, ignored", name);
                return;
            }
        };

        self.as_mut().show_theme(theme);

        let store = match &self.as_ref().rust().services {
            Some(s) => s.settings.clone(),
            None => return,
        };
        if let Err(e) = store.save(&Settings { theme }) {
            tracing::error!("Failed to save settings: {}", e);
            self.as_mut()
                .report_error(format!("Ayarlar kaydedilemedi: {}", e));
        }
    }

    pub fn set_auto_refresh_enabled(mut self: Pin<&mut Self>, enabled: bool) {
        if !enabled {
            if let Some(mut timer) = self.as_mut().rust_mut().timer.take() {
                timer.stop();
            }
            self.as_mut().set_auto_refresh(false);
            return;
        }

        if !self.as_mut().rust_mut().ensure_initialized() {
            self.as_mut().set_auto_refresh(false);
            return;
        }

        bridge::init_weather_service_channel();
        let (tx, period, runtime) = match (
            bridge::get_weather_service_tx(),
            &self.as_ref().rust().services,
            &self.as_ref().rust().runtime,
        ) {
            (Some(tx), Some(s), Some(r)) => (tx, s.auto_refresh_period, r.clone()),
            _ => return,
        };

        let mut timer = AutoRefresh::new(period);
        timer.start(&runtime, weather_tick_sender(tx));
        self.as_mut().rust_mut().timer = Some(timer);
        self.as_mut().set_auto_refresh(true);
    }

    /// Error dialog dismissed.
    pub fn acknowledge_error(mut self: Pin<&mut Self>) {
        self.as_mut().rust_mut().machine.acknowledge_error();
        self.as_mut().set_error_message(QString::from(""));
    }

    /// Drain the weather channel. Called from a QML Timer.
    pub fn poll_channel(mut self: Pin<&mut Self>) {
        while let Some(msg) = bridge::try_recv_weather_message() {
            match msg {
                WeatherServiceMessage::AutoRefreshTick => {
                    if self.as_ref().rust().accepts_tick() {
                        self.as_mut().refresh();
                    } else {
                        tracing::debug!("Auto-refresh is off, stale tick dropped");
                    }
                }
                WeatherServiceMessage::Refresh(event) => self.as_mut().apply_event(event),
            }
        }
    }

    pub fn chart_count(&self) -> i32 {
        self.rust().chart.len() as i32
    }

    pub fn chart_label(&self, index: i32) -> QString {
        let rust = self.rust();
        rust.chart_index(index)
            .and_then(|i| rust.chart.label(i))
            .map(QString::from)
            .unwrap_or_default()
    }

    pub fn chart_x(&self, index: i32) -> f64 {
        let rust = self.rust();
        rust.chart_index(index)
            .map(|i| rust.chart.x_fraction(i))
            .unwrap_or(0.0)
    }

    pub fn chart_y(&self, index: i32) -> f64 {
        let rust = self.rust();
        rust.chart_index(index)
            .map(|i| rust.chart.y_fraction(i))
            .unwrap_or(0.0)
    }

    pub fn chart_tick_count(&self) -> i32 {
        CHART_TICKS as i32
    }

    /// Gridline value, lowest first.
    pub fn chart_tick(&self, index: i32) -> f64 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.rust().chart.y_ticks(CHART_TICKS).get(i).copied())
            .unwrap_or(0.0)
    }

    fn show_theme(mut self: Pin<&mut Self>, theme: Theme) {
        let palette = theme.palette();
        self.as_mut().set_theme(QString::from(theme.as_str()));
        self.as_mut().set_window_color(QString::from(palette.window));
        self.as_mut().set_text_color(QString::from(palette.text));
    }

    fn report_error(mut self: Pin<&mut Self>, message: String) {
        self.as_mut().set_error_message(QString::from(message.as_str()));
        self.as_mut().error_raised();
    }

    fn apply_event(mut self: Pin<&mut Self>, event: RefreshEvent) {
        self.as_mut().rust_mut().machine.apply(&event);

        match event {
            RefreshEvent::CityResolved(city) => {
                self.as_mut().set_city_input(QString::from(city.as_str()));
            }
            RefreshEvent::Current(snapshot) => {
                self.as_mut()
                    .set_result_text(QString::from(snapshot.summary().as_str()));
            }
            RefreshEvent::Icon(png) => {
                let source = png.as_deref().map(icon_data_url).unwrap_or_default();
                self.as_mut().set_icon_source(QString::from(source.as_str()));
            }
            RefreshEvent::Forecast(forecast) => {
                let text = forecast.display_lines().join("\n");
                self.as_mut().set_forecast_text(QString::from(text.as_str()));
                self.as_mut().rust_mut().chart = ChartSeries::from_forecast(&forecast);
                self.as_mut().forecast_changed();
            }
            RefreshEvent::Failed(message) => {
                self.as_mut().set_loading(false);
                self.as_mut().report_error(message);
            }
            RefreshEvent::Completed => {
                self.as_mut().set_loading(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_icon_data_url() {
        assert_eq!(icon_data_url(b"abc"), "data:image/png;base64,YWJj");
        assert_eq!(icon_data_url(&[]), "data:image/png;base64,");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_queued_before_toggle_off_is_dropped() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut model = WeatherModelRust::default();
        assert!(!model.accepts_tick());

        let mut timer = AutoRefresh::new(Duration::from_secs(30));
        timer.start(&tokio::runtime::Handle::current(), weather_tick_sender(tx));
        model.timer = Some(timer);

        tokio::time::sleep(Duration::from_millis(30_050)).await;
        assert!(model.accepts_tick());

        // Toggle off while the tick is still waiting in the channel
        if let Some(mut timer) = model.timer.take() {
            timer.stop();
        }

        let queued: Vec<_> = rx.try_iter().collect();
        assert_eq!(queued.len(), 1);
        assert!(matches!(queued[0], WeatherServiceMessage::AutoRefreshTick));
        assert!(!model.accepts_tick());
    }

    #[test]
    fn test_stopped_timer_rejects_ticks() {
        let mut timer = AutoRefresh::new(Duration::from_secs(30));
        timer.stop();
        let model = WeatherModelRust {
            timer: Some(timer),
            ..Default::default()
        };
        assert!(!model.accepts_tick());
    }

    #[test]
    fn test_chart_index_bounds() {
        let model = WeatherModelRust {
            chart: ChartSeries::new(vec!["01.06".into(), "02.06".into()], vec![20.0, 22.0]),
            ..Default::default()
        };
        assert_eq!(model.chart_index(0), Some(0));
        assert_eq!(model.chart_index(1), Some(1));
        assert_eq!(model.chart_index(2), None);
        assert_eq!(model.chart_index(-1), None);
    }
}
