//! Reward manager - ties the reward components together
//!
//! Handles the "complete task", "open crate", "buy skill" and focus flows:
//! rolls, XP and gem awards, progress counters, streaks, and medal checks.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::crates::{roll_bronze, CrateOpener, CrateReward};
use super::critical::{CriticalChances, CriticalResult, CriticalRoller};
use super::currency::GemLedger;
use super::medals::{MedalCriteria, MedalId, MedalTracker};
use super::skills::SkillTree;
use super::streaks::StreakTracker;
use super::xp::{LevelUp, XpLedger};
use crate::social::FriendList;
use crate::store::{Result, StorageKey, Store};
use crate::tasks::TaskStore;

/// Persisted progress counters feeding medal criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    pub tasks_completed: u64,
    pub quests_completed: u64,
    /// Lifetime gems earned, spending does not reduce it
    pub gems_earned: u64,
    pub focus_minutes: u64,
    pub is_premium: bool,
    pub crates_available: u32,
}

/// Base rewards per completed task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSettings {
    pub task_xp: u64,
    pub task_gems: u64,
    pub chances: CriticalChances,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            task_xp: 10,
            task_gems: 1,
            chances: CriticalChances::default(),
        }
    }
}

/// Something that happened while rewarding an action
#[derive(Debug, Clone, PartialEq)]
pub enum RewardEvent {
    Critical(CriticalResult),
    XpAwarded { amount: u64, multiplier: f64 },
    GemsAwarded { amount: u64 },
    CrateEarned { available: u32 },
    CrateOpened(CrateReward),
    StreakExtended { days: u32 },
    LevelUp(LevelUp),
    MedalEarned(MedalId),
}

/// Main entry point for reward flows
#[derive(Clone)]
pub struct RewardManager {
    store: Store,
    settings: RewardSettings,
    gems: GemLedger,
    xp: XpLedger,
    roller: CriticalRoller,
    medals: MedalTracker,
    skills: SkillTree,
    streaks: StreakTracker,
}

impl RewardManager {
    pub fn new(store: Store, settings: RewardSettings) -> Self {
        let gems = GemLedger::new(store.clone());
        let xp = XpLedger::new(store.clone());
        Self {
            roller: CriticalRoller::with_chances(store.clone(), settings.chances),
            medals: MedalTracker::new(store.clone()),
            skills: SkillTree::new(store.clone(), gems.clone(), xp.clone()),
            streaks: StreakTracker::new(store.clone()),
            gems,
            xp,
            settings,
            store,
        }
    }

    pub fn gems(&self) -> &GemLedger {
        &self.gems
    }

    pub fn xp(&self) -> &XpLedger {
        &self.xp
    }

    pub fn roller(&self) -> &CriticalRoller {
        &self.roller
    }

    pub fn medals(&self) -> &MedalTracker {
        &self.medals
    }

    pub fn skills(&self) -> &SkillTree {
        &self.skills
    }

    pub fn streaks(&self) -> &StreakTracker {
        &self.streaks
    }

    pub fn progress(&self) -> Result<Progress> {
        self.store.load(StorageKey::Progress)
    }

    fn update_progress(&self, f: impl FnOnce(&mut Progress)) -> Result<Progress> {
        let mut progress = self.progress()?;
        f(&mut progress);
        self.store.save(StorageKey::Progress, &progress)?;
        Ok(progress)
    }

    // ========================================
    // TASK COMPLETION
    // ========================================

    /// Complete a task and hand out its rewards. Nothing is awarded when the
    /// task is unknown or already completed.
    pub fn complete_task(&self, tasks: &mut TaskStore, id: &str) -> Result<Vec<RewardEvent>> {
        if !tasks.complete_task(id)? {
            return Ok(Vec::new());
        }
        self.reward_completion_at(&mut rand::thread_rng(), Local::now().naive_local())
    }

    /// Rewards for one completed task at local time `now`
    pub fn reward_completion_at<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: NaiveDateTime,
    ) -> Result<Vec<RewardEvent>> {
        let mut events = Vec::new();

        let roll = self.roller.roll_with(rng)?;
        if roll.is_critical || roll.crate_reward {
            events.push(RewardEvent::Critical(roll));
        }

        let multiplier = self.skills.xp_multiplier()?;
        let base = self.settings.task_xp * u64::from(roll.xp_multiplier);
        let amount = (base as f64 * multiplier).round() as u64;
        let (_, level_up) = self.xp.award(amount)?;
        events.push(RewardEvent::XpAwarded { amount, multiplier });

        let task_gems = self.settings.task_gems;
        if task_gems > 0 {
            self.gems.add(task_gems)?;
            events.push(RewardEvent::GemsAwarded { amount: task_gems });
        }

        let progress = self.update_progress(|p| {
            p.tasks_completed += 1;
            p.gems_earned += task_gems;
            if roll.crate_reward {
                p.crates_available += 1;
            }
        })?;
        if roll.crate_reward {
            events.push(RewardEvent::CrateEarned {
                available: progress.crates_available,
            });
        }

        let (streak, extended) = self.streaks.record_on(now.date())?;
        if extended {
            events.push(RewardEvent::StreakExtended {
                days: streak.current,
            });
        }

        if let Some(level_up) = level_up {
            tracing::info!("Level up: {} -> {}", level_up.old_level, level_up.new_level);
            events.push(RewardEvent::LevelUp(level_up));
        }

        let criteria = self.criteria(now.date(), Some(now.hour()))?;
        for id in self.medals.evaluate(&criteria)? {
            events.push(RewardEvent::MedalEarned(id));
        }

        Ok(events)
    }

    // ========================================
    // CRATES
    // ========================================

    pub fn crates_available(&self) -> Result<u32> {
        Ok(self.progress()?.crates_available)
    }

    /// Start opening a pending crate. The reward is applied when the opener
    /// reveals it. Returns `false` with no pending crate or a busy opener.
    pub fn open_crate(&self, opener: &mut CrateOpener) -> Result<bool> {
        if self.crates_available()? == 0 || !opener.is_idle() {
            return Ok(false);
        }

        let reward = roll_bronze(&mut rand::thread_rng());
        let manager = self.clone();
        Ok(opener.open(reward, move |reward| {
            if let Err(e) = manager.claim_crate(reward) {
                tracing::warn!("Failed to apply crate reward {}: {}", reward, e);
            }
        }))
    }

    /// Consume one pending crate and apply `reward`
    pub fn claim_crate(&self, reward: CrateReward) -> Result<Vec<RewardEvent>> {
        let mut progress = self.progress()?;
        if progress.crates_available == 0 {
            tracing::debug!("No crate to claim");
            return Ok(Vec::new());
        }
        progress.crates_available -= 1;

        let mut events = vec![RewardEvent::CrateOpened(reward)];
        match reward {
            CrateReward::Xp(amount) => {
                let (_, level_up) = self.xp.award(amount)?;
                events.push(RewardEvent::XpAwarded {
                    amount,
                    multiplier: 1.0,
                });
                if let Some(level_up) = level_up {
                    events.push(RewardEvent::LevelUp(level_up));
                }
            }
            CrateReward::Gems(amount) => {
                self.gems.add(amount)?;
                progress.gems_earned += amount;
                events.push(RewardEvent::GemsAwarded { amount });
            }
        }
        self.store.save(StorageKey::Progress, &progress)?;
        tracing::info!("Crate opened: {}", reward);

        for id in self.check_medals()? {
            events.push(RewardEvent::MedalEarned(id));
        }
        Ok(events)
    }

    // ========================================
    // OTHER PROGRESS
    // ========================================

    /// Add finished focus minutes
    pub fn record_focus(&self, minutes: u64) -> Result<Vec<MedalId>> {
        self.update_progress(|p| p.focus_minutes += minutes)?;
        self.check_medals()
    }

    pub fn complete_quest(&self) -> Result<Vec<MedalId>> {
        self.update_progress(|p| p.quests_completed += 1)?;
        self.check_medals()
    }

    pub fn set_premium(&self, premium: bool) -> Result<Vec<MedalId>> {
        self.update_progress(|p| p.is_premium = premium)?;
        self.check_medals()
    }

    /// Spend gems to feed the pet at the current (skill-adjusted) cost
    pub fn feed_pet(&self) -> Result<bool> {
        let cost = self.skills.pet_feeding_cost()?;
        self.gems.spend(cost)
    }

    /// Evaluate medals against the current counters
    pub fn check_medals(&self) -> Result<Vec<MedalId>> {
        let criteria = self.criteria(Local::now().date_naive(), None)?;
        self.medals.evaluate(&criteria)
    }

    fn criteria(&self, today: NaiveDate, completed_at_hour: Option<u32>) -> Result<MedalCriteria> {
        let progress = self.progress()?;
        Ok(MedalCriteria {
            tasks_completed: progress.tasks_completed,
            streak_days: self.streaks.current_days_on(today)?,
            gems_total: progress.gems_earned,
            quests_completed: progress.quests_completed,
            is_premium: progress.is_premium,
            focus_minutes: progress.focus_minutes,
            friends_count: FriendList::new(self.store.clone()).len()?,
            completed_at_hour,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::critical::TestMode;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn no_luck() -> RewardSettings {
        RewardSettings {
            chances: CriticalChances {
                critical_hit_chance: 0,
                crate_reward_chance: 0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_completion() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        let mut rng = StdRng::seed_from_u64(1);
        let events = manager.reward_completion_at(&mut rng, at(12)).unwrap();

        assert!(events.contains(&RewardEvent::XpAwarded {
            amount: 10,
            multiplier: 1.0
        }));
        assert!(events.contains(&RewardEvent::GemsAwarded { amount: 1 }));
        assert!(events.contains(&RewardEvent::MedalEarned(MedalId::FirstTask)));
        assert!(!events.iter().any(|e| matches!(e, RewardEvent::Critical(_))));

        let progress = manager.progress().unwrap();
        assert_eq!(progress.tasks_completed, 1);
        assert_eq!(progress.gems_earned, 1);
        assert_eq!(manager.gems().balance().unwrap(), 1);
        assert_eq!(manager.xp().state().unwrap().total, 10);
    }

    #[test]
    fn test_forced_critical_and_crate() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        manager.roller().set_test_mode(TestMode::Critical, true).unwrap();
        manager.roller().set_test_mode(TestMode::Crate, true).unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        let events = manager.reward_completion_at(&mut rng, at(23)).unwrap();

        assert!(events.contains(&RewardEvent::XpAwarded {
            amount: 20,
            multiplier: 1.0
        }));
        assert!(events.contains(&RewardEvent::CrateEarned { available: 1 }));
        assert!(events.contains(&RewardEvent::MedalEarned(MedalId::NightOwl)));
        assert_eq!(manager.crates_available().unwrap(), 1);
    }

    #[test]
    fn test_skill_multiplier_applies() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        manager.skills().force_unlock("xp_boost_10").unwrap();
        manager.skills().force_unlock("xp_combo").unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        manager.reward_completion_at(&mut rng, at(9)).unwrap();
        // 10 * 1.1 * 1.25 = 13.75
        assert_eq!(manager.xp().current().unwrap(), 14);
    }

    #[test]
    fn test_claim_crate_requires_pending() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        assert!(manager.claim_crate(CrateReward::Gems(10)).unwrap().is_empty());
        assert_eq!(manager.gems().balance().unwrap(), 0);

        manager.update_progress(|p| p.crates_available = 1).unwrap();
        let events = manager.claim_crate(CrateReward::Gems(10)).unwrap();
        assert_eq!(events[0], RewardEvent::CrateOpened(CrateReward::Gems(10)));
        assert_eq!(manager.gems().balance().unwrap(), 10);
        assert_eq!(manager.progress().unwrap().gems_earned, 10);
        assert_eq!(manager.crates_available().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_crate_applies_on_reveal() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        let mut opener = CrateOpener::new();
        assert!(!manager.open_crate(&mut opener).unwrap());

        manager.update_progress(|p| p.crates_available = 1).unwrap();
        assert!(manager.open_crate(&mut opener).unwrap());
        assert_eq!(manager.crates_available().unwrap(), 1);

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(manager.crates_available().unwrap(), 0);
        let xp = manager.xp().state().unwrap().total;
        let gems = manager.gems().balance().unwrap();
        assert!(xp > 0 || gems > 0);
    }

    #[test]
    fn test_focus_and_premium_medals() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        assert!(manager.record_focus(250).unwrap().is_empty());
        assert_eq!(manager.record_focus(50).unwrap(), vec![MedalId::FocusTime]);
        assert_eq!(
            manager.set_premium(true).unwrap(),
            vec![MedalId::PremiumMember]
        );
        // Turning premium off never revokes the medal
        manager.set_premium(false).unwrap();
        assert!(manager.medals().is_earned(MedalId::PremiumMember).unwrap());
    }

    #[test]
    fn test_quest_master() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        for _ in 0..9 {
            assert!(manager.complete_quest().unwrap().is_empty());
        }
        assert_eq!(manager.complete_quest().unwrap(), vec![MedalId::QuestMaster]);
    }

    #[test]
    fn test_feed_pet() {
        let manager = RewardManager::new(Store::in_memory(), no_luck());
        manager.gems().set_balance(7).unwrap();
        assert!(manager.feed_pet().unwrap());
        assert!(!manager.feed_pet().unwrap());
        manager.skills().force_unlock("pet_discount").unwrap();
        assert!(manager.feed_pet().unwrap());
        assert_eq!(manager.gems().balance().unwrap(), 0);
    }
}
