//! Cancellable scheduled callbacks
//!
//! Every timer in the crate (crate animation, focus countdown, leaderboard
//! countdown, mirror restoration gate) runs as a [`Scheduled`] task. Dropping
//! the handle aborts the task, so a timer can never outlive its owner.
//!
//! Scheduling requires a running tokio runtime.

mod focus;

pub use focus::{FocusTimer, DEFAULT_FOCUS_DURATION};

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Handle to a scheduled callback; aborts on drop
#[derive(Debug)]
pub struct Scheduled {
    handle: Option<JoinHandle<()>>,
}

impl Scheduled {
    /// Run `future` on the runtime
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    /// Run `callback` once after `delay`
    pub fn after<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(async move {
            time::sleep(delay).await;
            callback();
        })
    }

    /// Run `callback` every `period`, first after one full period
    pub fn every<F>(period: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                callback();
            }
        })
    }

    /// A handle with nothing scheduled
    pub fn idle() -> Self {
        Self { handle: None }
    }

    /// Abort the callback if it has not run yet
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the callback is still pending or running
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Scheduled {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let scheduled = Scheduled::after(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(999)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        tokio::task::yield_now().await;
        assert!(!scheduled.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut scheduled = Scheduled::after(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(scheduled.is_active());
        scheduled.cancel();
        assert!(!scheduled.is_active());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_stops_on_drop() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let scheduled = Scheduled::every(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        drop(scheduled);
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_idle_handle() {
        let mut idle = Scheduled::idle();
        assert!(!idle.is_active());
        idle.cancel();
    }
}
