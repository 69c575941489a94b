//! Repeating auto-refresh trigger.
//!
//! The timer only signals; the receiver decides whether to start a refresh.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct AutoRefresh {
    period: Duration,
    token: Option<CancellationToken>,
}

impl AutoRefresh {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            token: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    /// Call `on_tick` every period, first one period from now. Replaces any
    /// timer already running.
    pub fn start<F>(&mut self, runtime: &Handle, on_tick: F)
    where
        F: Fn() + Send + 'static,
    {
        self.stop();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = self.period;

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            // Late ticks shift the schedule; they are never fired in a burst
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::debug!("Auto-refresh tick");
                        on_tick();
                    }
                }
            }
            tracing::debug!("Auto-refresh timer stopped");
        });

        tracing::info!("Auto-refresh started every {}s", period.as_secs());
        self.token = Some(token);
    }

    /// Cancel the timer. No tick fires after this returns.
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
            tracing::info!("Auto-refresh stopped");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tokio::time::sleep;

    fn drain(rx: &mut UnboundedReceiver<()>) -> usize {
        std::iter::from_fn(|| rx.try_recv().ok()).count()
    }

    fn counting_timer(period_secs: u64) -> (AutoRefresh, UnboundedReceiver<()>) {
        let (tx, rx) = unbounded_channel();
        let mut auto = AutoRefresh::new(Duration::from_secs(period_secs));
        auto.start(&Handle::current(), move || {
            let _ = tx.send(());
        });
        (auto, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period_until_stopped() {
        let (mut auto, mut rx) = counting_timer(30);
        assert!(auto.is_running());

        sleep(Duration::from_secs(29)).await;
        assert_eq!(drain(&mut rx), 0, "no tick before the first period");

        sleep(Duration::from_secs(2)).await; // t = 31s
        assert_eq!(drain(&mut rx), 1);

        sleep(Duration::from_secs(60)).await; // t = 91s
        assert_eq!(drain(&mut rx), 2);

        auto.stop();
        assert!(!auto.is_running());

        sleep(Duration::from_secs(300)).await;
        assert_eq!(drain(&mut rx), 0, "no tick after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (auto, mut rx) = counting_timer(30);
        drop(auto);

        sleep(Duration::from_secs(120)).await;
        assert_eq!(drain(&mut rx), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_timer() {
        let (tx, mut rx) = unbounded_channel();
        let mut auto = AutoRefresh::new(Duration::from_secs(30));

        let first = tx.clone();
        auto.start(&Handle::current(), move || {
            let _ = first.send(());
        });
        sleep(Duration::from_secs(10)).await;

        auto.start(&Handle::current(), move || {
            let _ = tx.send(());
        });

        // Old timer would have fired at 30s, the new one fires at 40s
        sleep(Duration::from_secs(25)).await; // t = 35s
        assert_eq!(drain(&mut rx), 0);

        sleep(Duration::from_secs(10)).await; // t = 45s
        assert_eq!(drain(&mut rx), 1);
        assert_eq!(auto.period(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_noop() {
        let mut auto = AutoRefresh::new(Duration::from_secs(30));
        auto.stop();
        assert!(!auto.is_running());
    }
}
