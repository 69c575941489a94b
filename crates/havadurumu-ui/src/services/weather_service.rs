//! Weather backend: one refresh per request, run on the tokio runtime.
//! Each pipeline event is forwarded to the UI thread as soon as it happens.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use havadurumu_services::{RefreshEvent, RefreshPipeline};

use crate::bridge;

#[derive(Debug, Clone)]
pub enum WeatherError {
    NotInitialized,
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::NotInitialized => write!(f, "Hava durumu servisi başlatılmadı"),
        }
    }
}

impl std::error::Error for WeatherError {}

/// Messages sent from async operations back to the UI thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    Refresh(RefreshEvent),
    /// The auto-refresh timer fired
    AutoRefreshTick,
}

/// Run one refresh for `city_input` in the background.
/// Every `RefreshEvent` is sent on the channel in order.
pub fn request_refresh(
    tx: &Sender<WeatherServiceMessage>,
    pipeline: Arc<RefreshPipeline>,
    city_input: String,
) {
    let tx = tx.clone();
    let runtime = match bridge::get_runtime() {
        Some(r) => r,
        None => {
            let _ = tx.send(WeatherServiceMessage::Refresh(RefreshEvent::Failed(
                WeatherError::NotInitialized.to_string(),
            )));
            return;
        }
    };

    runtime.spawn(async move {
        pipeline
            .run(&city_input, |event| {
                let _ = tx.send(WeatherServiceMessage::Refresh(event));
            })
            .await;
    });
}

/// Timer callback that posts `AutoRefreshTick` on the channel.
pub fn tick_sender(tx: Sender<WeatherServiceMessage>) -> impl Fn() + Send + 'static {
    move || {
        let _ = tx.send(WeatherServiceMessage::AutoRefreshTick);
    }
}
