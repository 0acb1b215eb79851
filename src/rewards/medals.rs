//! Medal catalog and one-way unlocks
//!
//! The catalog is fixed. Persisted state only records which medals were earned
//! and when; an earned medal is never reverted.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::{Result, StorageKey, Store};

/// Stable identifier of each catalog medal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MedalId {
    FirstTask,
    TaskMaster,
    FocusTime,
    StreakWarrior,
    SocialButterfly,
    EarlyBird,
    NightOwl,
    PremiumMember,
    QuestMaster,
    MoneyBags,
}

impl MedalId {
    /// Get the string ID used in persisted state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTask => "first_task",
            Self::TaskMaster => "task_master",
            Self::FocusTime => "focus_time",
            Self::StreakWarrior => "streak_warrior",
            Self::SocialButterfly => "social_butterfly",
            Self::EarlyBird => "early_bird",
            Self::NightOwl => "night_owl",
            Self::PremiumMember => "premium_member",
            Self::QuestMaster => "quest_master",
            Self::MoneyBags => "money_bags",
        }
    }

    /// Parse from persisted string
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }

    /// All medal IDs in catalog order
    pub fn all() -> &'static [MedalId] {
        &[
            Self::FirstTask,
            Self::TaskMaster,
            Self::FocusTime,
            Self::StreakWarrior,
            Self::SocialButterfly,
            Self::EarlyBird,
            Self::NightOwl,
            Self::PremiumMember,
            Self::QuestMaster,
            Self::MoneyBags,
        ]
    }

    pub fn def(&self) -> &'static MedalDef {
        // Catalog order matches `all()`
        &MEDALS[*self as usize]
    }
}

/// Catalog entry
#[derive(Debug, Clone)]
pub struct MedalDef {
    pub id: MedalId,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub static MEDALS: &[MedalDef] = &[
    MedalDef {
        id: MedalId::FirstTask,
        name: "First Steps",
        icon: "🎯",
        description: "Complete your first task",
    },
    MedalDef {
        id: MedalId::TaskMaster,
        name: "Task Master",
        icon: "✅",
        description: "Complete 50 tasks",
    },
    MedalDef {
        id: MedalId::FocusTime,
        name: "Focus Legend",
        icon: "⏱️",
        description: "Use focus timer for 5+ hours",
    },
    MedalDef {
        id: MedalId::StreakWarrior,
        name: "Streak Warrior",
        icon: "🔥",
        description: "Maintain a 7-day streak",
    },
    MedalDef {
        id: MedalId::SocialButterfly,
        name: "Social Butterfly",
        icon: "👥",
        description: "Add 5 friends",
    },
    MedalDef {
        id: MedalId::EarlyBird,
        name: "Early Bird",
        icon: "🌅",
        description: "Complete a task before 8 AM",
    },
    MedalDef {
        id: MedalId::NightOwl,
        name: "Night Owl",
        icon: "🌙",
        description: "Complete a task after 10 PM",
    },
    MedalDef {
        id: MedalId::PremiumMember,
        name: "Premium Member",
        icon: "💎",
        description: "Subscribe to Plus",
    },
    MedalDef {
        id: MedalId::QuestMaster,
        name: "Quest Master",
        icon: "🏆",
        description: "Complete 10 quests",
    },
    MedalDef {
        id: MedalId::MoneyBags,
        name: "Money Bags",
        icon: "💰",
        description: "Earn 1000 gems",
    },
];

/// Persisted medal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medal {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub earned: bool,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_date: Option<i64>,
}

impl From<&MedalDef> for Medal {
    fn from(def: &MedalDef) -> Self {
        Self {
            id: def.id.as_str().to_string(),
            name: def.name.to_string(),
            icon: def.icon.to_string(),
            description: def.description.to_string(),
            earned: false,
            earned_date: None,
        }
    }
}

/// Inputs checked against medal thresholds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedalCriteria {
    pub tasks_completed: u64,
    pub streak_days: u32,
    /// Lifetime gems earned
    pub gems_total: u64,
    pub quests_completed: u64,
    pub is_premium: bool,
    pub focus_minutes: u64,
    pub friends_count: usize,
    /// Local hour (0-23) of the task completion being evaluated, if any
    pub completed_at_hour: Option<u32>,
}

/// Medals whose thresholds the criteria meet, in catalog order
pub fn qualifying(criteria: &MedalCriteria) -> Vec<MedalId> {
    let hour = criteria.completed_at_hour;
    let checks = [
        (criteria.tasks_completed >= 1, MedalId::FirstTask),
        (criteria.tasks_completed >= 50, MedalId::TaskMaster),
        (criteria.focus_minutes >= 300, MedalId::FocusTime),
        (criteria.streak_days >= 7, MedalId::StreakWarrior),
        (criteria.friends_count >= 5, MedalId::SocialButterfly),
        (hour.is_some_and(|h| h < 8), MedalId::EarlyBird),
        (hour.is_some_and(|h| h >= 22), MedalId::NightOwl),
        (criteria.is_premium, MedalId::PremiumMember),
        (criteria.quests_completed >= 10, MedalId::QuestMaster),
        (criteria.gems_total >= 1000, MedalId::MoneyBags),
    ];

    checks
        .into_iter()
        .filter_map(|(met, id)| met.then_some(id))
        .collect()
}

/// Tracks earned medals
#[derive(Clone)]
pub struct MedalTracker {
    store: Store,
}

impl MedalTracker {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Every catalog medal in order, annotated with persisted earned state
    pub fn all(&self) -> Result<Vec<Medal>> {
        let persisted: Vec<Medal> = self.store.load(StorageKey::Medals)?;

        Ok(MEDALS
            .iter()
            .map(|def| {
                let mut medal = Medal::from(def);
                if let Some(saved) = persisted.iter().find(|m| m.id == medal.id) {
                    medal.earned = saved.earned;
                    medal.earned_date = saved.earned_date;
                }
                medal
            })
            .collect())
    }

    /// Earn a medal now; `false` if it was already earned
    pub fn earn(&self, id: MedalId) -> Result<bool> {
        Ok(!self.earn_all(&[id], Utc::now().timestamp_millis())?.is_empty())
    }

    /// Earn every medal the criteria qualify for, returning the newly earned ones
    pub fn evaluate(&self, criteria: &MedalCriteria) -> Result<Vec<MedalId>> {
        let candidates = qualifying(criteria);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        self.earn_all(&candidates, Utc::now().timestamp_millis())
    }

    pub fn earned_count(&self) -> Result<usize> {
        Ok(self.all()?.iter().filter(|m| m.earned).count())
    }

    pub fn is_earned(&self, id: MedalId) -> Result<bool> {
        Ok(self
            .all()?
            .iter()
            .any(|m| m.id == id.as_str() && m.earned))
    }

    fn earn_all(&self, ids: &[MedalId], now_ms: i64) -> Result<Vec<MedalId>> {
        let mut medals = self.all()?;
        let mut newly_earned = Vec::new();

        for id in ids {
            let Some(medal) = medals.iter_mut().find(|m| m.id == id.as_str()) else {
                continue;
            };
            if medal.earned {
                continue;
            }
            medal.earned = true;
            medal.earned_date = Some(now_ms);
            newly_earned.push(*id);
            tracing::info!("Medal earned: {} {}", medal.icon, medal.name);
        }

        if !newly_earned.is_empty() {
            self.store.save(StorageKey::Medals, &medals)?;
        }
        Ok(newly_earned)
    }
}
