//! Bronze crate opening
//!
//! Opening runs as a small state machine published on a `watch` channel:
//!
//! ```text
//! Idle ──open──▶ Rolling{index} ──2s──▶ Revealed(reward) ──1.5s──▶ Closing ──▶ Idle
//! ```
//!
//! The reward is applied when it is revealed. Dropping or cancelling the opener
//! aborts the sequence and returns it to `Idle`.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::watch;
use tokio::time;

use crate::timer::Scheduled;

/// One possible crate reward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateReward {
    Xp(u64),
    Gems(u64),
}

impl std::fmt::Display for CrateReward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xp(n) => write!(f, "{} XP", n),
            Self::Gems(n) => write!(f, "{} gems", n),
        }
    }
}

pub static BRONZE_REWARDS: &[CrateReward] = &[
    CrateReward::Xp(50),
    CrateReward::Xp(75),
    CrateReward::Gems(5),
    CrateReward::Xp(100),
    CrateReward::Gems(10),
    CrateReward::Xp(60),
];

/// Pick a bronze reward uniformly at random
pub fn roll_bronze<R: Rng + ?Sized>(rng: &mut R) -> CrateReward {
    // The table is a non-empty static
    BRONZE_REWARDS
        .choose(rng)
        .copied()
        .unwrap_or(CrateReward::Xp(50))
}

/// Observable opening state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CratePhase {
    Idle,
    /// Highlighted slot of [`BRONZE_REWARDS`]
    Rolling { index: usize },
    Revealed(CrateReward),
    Closing,
}

/// Durations of each animation phase
#[derive(Debug, Clone, Copy)]
pub struct CrateTimings {
    pub tick: Duration,
    pub rolling: Duration,
    pub reveal: Duration,
    pub closing: Duration,
}

impl Default for CrateTimings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            rolling: Duration::from_secs(2),
            reveal: Duration::from_millis(1500),
            closing: Duration::from_millis(300),
        }
    }
}

/// Drives one crate opening at a time
pub struct CrateOpener {
    timings: CrateTimings,
    phase: Arc<watch::Sender<CratePhase>>,
    sequence: Scheduled,
}

impl CrateOpener {
    pub fn new() -> Self {
        Self::with_timings(CrateTimings::default())
    }

    pub fn with_timings(timings: CrateTimings) -> Self {
        let (phase, _) = watch::channel(CratePhase::Idle);
        Self {
            timings,
            phase: Arc::new(phase),
            sequence: Scheduled::idle(),
        }
    }

    pub fn phase(&self) -> CratePhase {
        *self.phase.borrow()
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == CratePhase::Idle
    }

    pub fn subscribe(&self) -> watch::Receiver<CratePhase> {
        self.phase.subscribe()
    }

    /// Start the opening sequence for a pre-rolled `reward`. `on_reveal` runs
    /// once when the reward is revealed. Refused unless idle.
    pub fn open<F>(&mut self, reward: CrateReward, on_reveal: F) -> bool
    where
        F: FnOnce(CrateReward) + Send + 'static,
    {
        if !self.is_idle() {
            tracing::debug!("Crate already opening, ignoring");
            return false;
        }

        let phase = self.phase.clone();
        let timings = self.timings;
        let ticks = (timings.rolling.as_millis() / timings.tick.as_millis().max(1)).max(1) as usize;
        phase.send_replace(CratePhase::Rolling { index: 0 });

        self.sequence = Scheduled::spawn(async move {
            for step in 0..ticks {
                phase.send_replace(CratePhase::Rolling {
                    index: step % BRONZE_REWARDS.len(),
                });
                time::sleep(timings.tick).await;
            }

            on_reveal(reward);
            phase.send_replace(CratePhase::Revealed(reward));
            time::sleep(timings.reveal).await;

            phase.send_replace(CratePhase::Closing);
            time::sleep(timings.closing).await;
            phase.send_replace(CratePhase::Idle);
        });
        true
    }

    /// Abort a running sequence; nothing is applied if the reward was not yet revealed
    pub fn cancel(&mut self) {
        self.sequence.cancel();
        self.phase.send_replace(CratePhase::Idle);
    }
}

impl Default for CrateOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    #[test]
    fn test_roll_bronze_covers_table() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = Vec::new();
        for _ in 0..500 {
            let reward = roll_bronze(&mut rng);
            assert!(BRONZE_REWARDS.contains(&reward));
            if !seen.contains(&reward) {
                seen.push(reward);
            }
        }
        assert_eq!(seen.len(), BRONZE_REWARDS.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_sequence() {
        let applied = Arc::new(Mutex::new(None));
        let sink = applied.clone();
        let mut opener = CrateOpener::new();

        assert!(opener.open(CrateReward::Gems(10), move |r| {
            *sink.lock().unwrap() = Some(r);
        }));
        assert!(matches!(opener.phase(), CratePhase::Rolling { .. }));
        assert!(!opener.open(CrateReward::Xp(50), |_| {}));

        time::sleep(Duration::from_millis(1950)).await;
        assert!(matches!(opener.phase(), CratePhase::Rolling { .. }));
        assert!(applied.lock().unwrap().is_none());

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(opener.phase(), CratePhase::Revealed(CrateReward::Gems(10)));
        assert_eq!(*applied.lock().unwrap(), Some(CrateReward::Gems(10)));

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(opener.phase(), CratePhase::Closing);

        time::sleep(Duration::from_millis(300)).await;
        assert!(opener.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_skips_reward() {
        let applied = Arc::new(Mutex::new(None));
        let sink = applied.clone();
        let mut opener = CrateOpener::new();
        opener.open(CrateReward::Xp(100), move |r| {
            *sink.lock().unwrap() = Some(r);
        });

        time::sleep(Duration::from_millis(500)).await;
        opener.cancel();
        assert!(opener.is_idle());

        time::sleep(Duration::from_secs(5)).await;
        assert!(applied.lock().unwrap().is_none());
        assert!(opener.is_idle());
    }
}
