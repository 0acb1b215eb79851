//! Focus countdown
//!
//! `start` / `stop` / `reset` over a one-second ticker. `reset` always cancels the
//! running ticker before restoring the initial time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::Scheduled;

/// Default focus session length
pub const DEFAULT_FOCUS_DURATION: Duration = Duration::from_secs(25 * 60);

const TICK: Duration = Duration::from_secs(1);

/// Countdown timer publishing the remaining seconds
pub struct FocusTimer {
    duration: Duration,
    remaining: Arc<watch::Sender<u64>>,
    ticker: Scheduled,
}

impl FocusTimer {
    pub fn new(duration: Duration) -> Self {
        let (remaining, _) = watch::channel(duration.as_secs());
        Self {
            duration,
            remaining: Arc::new(remaining),
            ticker: Scheduled::idle(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn time_left(&self) -> Duration {
        Duration::from_secs(*self.remaining.borrow())
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_active()
    }

    /// Remaining seconds, updated every tick
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.subscribe()
    }

    /// Start or resume the countdown. `on_finish` receives the completed session
    /// length in minutes. Returns `false` if already running or nothing is left.
    pub fn start<F>(&mut self, on_finish: F) -> bool
    where
        F: FnOnce(u64) + Send + 'static,
    {
        if self.is_running() || *self.remaining.borrow() == 0 {
            return false;
        }

        let remaining = self.remaining.clone();
        let minutes = self.duration.as_secs() / 60;
        self.ticker = Scheduled::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let mut left = 0;
                remaining.send_modify(|secs| {
                    *secs = secs.saturating_sub(1);
                    left = *secs;
                });
                if left == 0 {
                    tracing::info!("Focus session finished ({} min)", minutes);
                    on_finish(minutes);
                    break;
                }
            }
        });
        true
    }

    /// Pause, keeping the remaining time
    pub fn stop(&mut self) {
        self.ticker.cancel();
    }

    /// Cancel any running countdown and restore the full duration
    pub fn reset(&mut self) {
        self.ticker.cancel();
        self.remaining.send_replace(self.duration.as_secs());
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_countdown_finishes() {
        let finished = Arc::new(AtomicU64::new(0));
        let sink = finished.clone();
        let mut timer = FocusTimer::new(Duration::from_secs(120));

        assert!(timer.start(move |minutes| sink.store(minutes, Ordering::SeqCst)));
        assert!(!timer.start(|_| {}));

        time::sleep(Duration::from_millis(60_500)).await;
        assert_eq!(timer.time_left(), Duration::from_secs(60));

        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(timer.time_left(), Duration::ZERO);
        assert_eq!(finished.load(Ordering::SeqCst), 2);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_keeps_remaining() {
        let mut timer = FocusTimer::new(Duration::from_secs(60));
        timer.start(|_| {});
        time::sleep(Duration::from_millis(10_500)).await;
        timer.stop();

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(timer.time_left(), Duration::from_secs(50));
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_before_restoring() {
        let finished = Arc::new(AtomicU64::new(0));
        let sink = finished.clone();
        let mut timer = FocusTimer::new(Duration::from_secs(5));
        timer.start(move |m| {
            sink.fetch_add(m + 1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_millis(3500)).await;

        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.time_left(), Duration::from_secs(5));

        // The old ticker must not keep counting down the restored time
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.time_left(), Duration::from_secs(5));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
