//! Skill tree engine
//!
//! Skills form a small DAG: a skill can be bought once all of its prerequisites
//! are bought. Purchases debit XP or gems and are never revoked.
//!
//! Persisted state keeps the purchased/unlocked ids as sorted arrays so the
//! stored JSON is deterministic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::currency::GemLedger;
use super::xp::XpLedger;
use crate::store::{Result, StorageKey, Store};

/// Pet feeding cost in gems without the discount skill
pub const PET_FEEDING_COST: u64 = 5;

/// Pet feeding cost with `pet_discount`
pub const DISCOUNTED_PET_FEEDING_COST: u64 = 2;

/// Which tree a skill belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tree {
    Forgiveness,
    XpMastery,
    PetPower,
}

impl Tree {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forgiveness => "forgiveness",
            Self::XpMastery => "xp_mastery",
            Self::PetPower => "pet_power",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "forgiveness" => Some(Self::Forgiveness),
            "xp_mastery" | "xp" => Some(Self::XpMastery),
            "pet_power" | "pet" => Some(Self::PetPower),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Forgiveness => "Forgiveness",
            Self::XpMastery => "XP Mastery",
            Self::PetPower => "Pet Power",
        }
    }

    pub fn all() -> &'static [Tree] {
        &[Self::Forgiveness, Self::XpMastery, Self::PetPower]
    }
}

/// Currency a skill is paid with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Xp,
    Gems,
}

impl CostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xp => "xp",
            Self::Gems => "gems",
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone)]
pub struct SkillDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub cost: u64,
    pub cost_type: CostType,
    pub tree: Tree,
    /// 1-based position in the tree
    pub level: u32,
    pub effects: &'static [&'static str],
    pub prerequisites: &'static [&'static str],
    /// XP multiplier granted while purchased
    pub xp_multiplier: Option<f64>,
}

pub static SKILLS: &[SkillDef] = &[
    // === FORGIVENESS ===
    SkillDef {
        id: "forgive_skip_day",
        name: "Skip a Day",
        description: "Skip one day without losing your streak",
        icon: "⏭️",
        cost: 100,
        cost_type: CostType::Xp,
        tree: Tree::Forgiveness,
        level: 1,
        effects: &["Use once to skip a day without losing streak bonus"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    SkillDef {
        id: "forgive_retry",
        name: "Task Retry",
        description: "Get another attempt on a failed task",
        icon: "🔄",
        cost: 50,
        cost_type: CostType::Xp,
        tree: Tree::Forgiveness,
        level: 1,
        effects: &["Retry a task you marked as incomplete"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    SkillDef {
        id: "forgive_double_streak",
        name: "Streak Multiplier",
        description: "2x your streak bonus rewards",
        icon: "⚡",
        cost: 150,
        cost_type: CostType::Xp,
        tree: Tree::Forgiveness,
        level: 2,
        effects: &["Doubles XP gained from streak bonuses"],
        prerequisites: &["forgive_skip_day"],
        xp_multiplier: None,
    },
    SkillDef {
        id: "forgive_extend",
        name: "Emergency Extension",
        description: "Extend a task due date by 1 day",
        icon: "📅",
        cost: 75,
        cost_type: CostType::Xp,
        tree: Tree::Forgiveness,
        level: 1,
        effects: &["Use to extend a task deadline when you need more time"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    // === XP MASTERY ===
    SkillDef {
        id: "xp_boost_10",
        name: "XP Boost +10%",
        description: "Gain 10% more XP from all tasks",
        icon: "📈",
        cost: 80,
        cost_type: CostType::Xp,
        tree: Tree::XpMastery,
        level: 1,
        effects: &["+10% XP from completing tasks"],
        prerequisites: &[],
        xp_multiplier: Some(1.10),
    },
    SkillDef {
        id: "xp_streak_bonus",
        name: "Streak Bonus",
        description: "+5% XP per day of streak",
        icon: "🔥",
        cost: 100,
        cost_type: CostType::Xp,
        tree: Tree::XpMastery,
        level: 1,
        effects: &["Earn bonus XP based on current streak (5% per day)"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    SkillDef {
        id: "xp_combo",
        name: "Task Combo",
        description: "Complete 3 tasks in a row for 25% bonus XP",
        icon: "🎯",
        cost: 120,
        cost_type: CostType::Xp,
        tree: Tree::XpMastery,
        level: 2,
        effects: &["Complete 3 consecutive tasks to earn 25% XP bonus"],
        prerequisites: &["xp_boost_10"],
        xp_multiplier: Some(1.25),
    },
    SkillDef {
        id: "xp_social",
        name: "Social XP",
        description: "Earn XP by helping friends",
        icon: "👥",
        cost: 90,
        cost_type: CostType::Xp,
        tree: Tree::XpMastery,
        level: 1,
        effects: &["Gain XP when friends complete their tasks"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    // === PET POWER ===
    SkillDef {
        id: "pet_xp_boost",
        name: "Pet XP Boost",
        description: "Your pet gains 15% more XP",
        icon: "🐣",
        cost: 85,
        cost_type: CostType::Xp,
        tree: Tree::PetPower,
        level: 1,
        effects: &["+15% XP gains for your pet"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    SkillDef {
        id: "pet_discount",
        name: "Efficient Feeding",
        description: "Pet feeding costs 2 gems instead of 5",
        icon: "💎",
        cost: 110,
        cost_type: CostType::Xp,
        tree: Tree::PetPower,
        level: 1,
        effects: &["Reduce pet feeding gem cost from 5 to 2"],
        prerequisites: &[],
        xp_multiplier: None,
    },
    SkillDef {
        id: "pet_talent",
        name: "Pet Talent",
        description: "Unlock special pet abilities",
        icon: "✨",
        cost: 130,
        cost_type: CostType::Xp,
        tree: Tree::PetPower,
        level: 2,
        effects: &["Pet can perform special actions for bonus rewards"],
        prerequisites: &["pet_xp_boost"],
        xp_multiplier: None,
    },
    SkillDef {
        id: "pet_buddy",
        name: "Buddy Bonus",
        description: "Get rewards when pet reaches new level",
        icon: "🎁",
        cost: 95,
        cost_type: CostType::Xp,
        tree: Tree::PetPower,
        level: 1,
        effects: &["Earn XP and gems when your pet levels up"],
        prerequisites: &[],
        xp_multiplier: None,
    },
];

/// Look up a catalog skill by id
pub fn find_skill(id: &str) -> Option<&'static SkillDef> {
    SKILLS.iter().find(|s| s.id == id)
}

/// Catalog skill annotated with the player's state
#[derive(Debug, Clone)]
pub struct Skill {
    pub def: &'static SkillDef,
    pub unlocked: bool,
    pub purchased: bool,
}

/// Persisted skill state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillState {
    pub unlocked_skills: BTreeSet<String>,
    pub purchased_skills: BTreeSet<String>,
    pub skill_points: u64,
}

/// Emitted whenever the purchased set grows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillEvent {
    Purchased { id: &'static str },
    ForceUnlocked { id: &'static str },
}

/// Buys skills with XP or gems
#[derive(Clone)]
pub struct SkillTree {
    store: Store,
    gems: GemLedger,
    xp: XpLedger,
    events: broadcast::Sender<SkillEvent>,
}

impl SkillTree {
    pub fn new(store: Store, gems: GemLedger, xp: XpLedger) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            gems,
            xp,
            events,
        }
    }

    /// Receive skill change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SkillEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> Result<SkillState> {
        self.store.load(StorageKey::Skills)
    }

    /// All skills in catalog order
    pub fn list(&self) -> Result<Vec<Skill>> {
        let state = self.state()?;
        Ok(SKILLS
            .iter()
            .map(|def| Skill {
                def,
                unlocked: state.unlocked_skills.contains(def.id),
                purchased: state.purchased_skills.contains(def.id),
            })
            .collect())
    }

    pub fn list_by_tree(&self, tree: Tree) -> Result<Vec<Skill>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|s| s.def.tree == tree)
            .collect())
    }

    /// Known, not yet purchased, and every prerequisite purchased
    pub fn can_purchase(&self, id: &str) -> Result<bool> {
        let Some(def) = find_skill(id) else {
            return Ok(false);
        };
        let state = self.state()?;
        Ok(!state.purchased_skills.contains(def.id) && prerequisites_met(def, &state))
    }

    /// Buy a skill. Fails without any state change when the skill is unknown,
    /// already purchased, missing prerequisites, or unaffordable.
    pub fn purchase(&self, id: &str) -> Result<bool> {
        let Some(def) = find_skill(id) else {
            tracing::debug!("Unknown skill '{}'", id);
            return Ok(false);
        };

        let mut state = self.state()?;
        if state.purchased_skills.contains(def.id) {
            tracing::debug!("Skill '{}' already purchased", def.id);
            return Ok(false);
        }
        if !prerequisites_met(def, &state) {
            tracing::debug!("Prerequisites not met for '{}'", def.id);
            return Ok(false);
        }

        let paid = match def.cost_type {
            CostType::Xp => self.xp.spend(def.cost)?,
            CostType::Gems => self.gems.spend(def.cost)?,
        };
        if !paid {
            return Ok(false);
        }

        state.purchased_skills.insert(def.id.to_string());
        state.unlocked_skills.insert(def.id.to_string());
        if let Err(e) = self.store.save(StorageKey::Skills, &state) {
            // Put the currency back so the debit and the purchase stay together
            self.refund(def)?;
            return Err(e);
        }

        tracing::info!(
            "Purchased skill '{}' for {} {}",
            def.id,
            def.cost,
            def.cost_type.as_str()
        );
        let _ = self.events.send(SkillEvent::Purchased { id: def.id });
        Ok(true)
    }

    /// Dev tool: add a skill to the purchased set without cost or prerequisite checks
    pub fn force_unlock(&self, id: &str) -> Result<bool> {
        let Some(def) = find_skill(id) else {
            return Ok(false);
        };

        let mut state = self.state()?;
        state.purchased_skills.insert(def.id.to_string());
        state.unlocked_skills.insert(def.id.to_string());
        self.store.save(StorageKey::Skills, &state)?;

        tracing::info!("Force-unlocked skill '{}'", def.id);
        let _ = self.events.send(SkillEvent::ForceUnlocked { id: def.id });
        Ok(true)
    }

    pub fn is_purchased(&self, id: &str) -> Result<bool> {
        Ok(self.state()?.purchased_skills.contains(id))
    }

    /// Purchased skills in catalog order
    pub fn active_skills(&self) -> Result<Vec<Skill>> {
        Ok(self.list()?.into_iter().filter(|s| s.purchased).collect())
    }

    /// Purchased ids, sorted
    pub fn purchased_ids(&self) -> Result<Vec<String>> {
        Ok(self.state()?.purchased_skills.into_iter().collect())
    }

    /// Product of the multipliers of every purchased skill that grants one
    pub fn xp_multiplier(&self) -> Result<f64> {
        Ok(self
            .active_skills()?
            .iter()
            .filter_map(|s| s.def.xp_multiplier)
            .product())
    }

    pub fn pet_feeding_cost(&self) -> Result<u64> {
        if self.is_purchased("pet_discount")? {
            Ok(DISCOUNTED_PET_FEEDING_COST)
        } else {
            Ok(PET_FEEDING_COST)
        }
    }

    fn refund(&self, def: &SkillDef) -> Result<()> {
        match def.cost_type {
            CostType::Xp => self.xp.refund(def.cost),
            CostType::Gems => self.gems.add(def.cost).map(|_| ()),
        }
    }
}

fn prerequisites_met(def: &SkillDef, state: &SkillState) -> bool {
    def.prerequisites
        .iter()
        .all(|p| state.purchased_skills.contains(*p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (SkillTree, XpLedger, GemLedger) {
        let store = Store::in_memory();
        let gems = GemLedger::new(store.clone());
        let xp = XpLedger::new(store.clone());
        (SkillTree::new(store, gems.clone(), xp.clone()), xp, gems)
    }

    #[test]
    fn test_catalog_is_a_dag_of_known_ids() {
        assert_eq!(SKILLS.len(), 12);
        for skill in SKILLS {
            for prereq in skill.prerequisites {
                assert!(find_skill(prereq).is_some(), "{} -> {}", skill.id, prereq);
                assert_ne!(*prereq, skill.id);
            }
        }
    }

    #[test]
    fn test_list_by_tree() {
        let (skills, _, _) = tree();
        for t in Tree::all() {
            assert_eq!(skills.list_by_tree(*t).unwrap().len(), 4);
        }
    }

    #[test]
    fn test_purchase_debits_xp() {
        let (skills, xp, _) = tree();
        xp.award(100).unwrap();

        assert!(skills.can_purchase("xp_boost_10").unwrap());
        assert!(skills.purchase("xp_boost_10").unwrap());
        assert_eq!(xp.current().unwrap(), 20);
        assert!(skills.is_purchased("xp_boost_10").unwrap());
        assert!((skills.xp_multiplier().unwrap() - 1.10).abs() < 1e-9);

        // Second attempt fails
        xp.award(100).unwrap();
        assert!(!skills.purchase("xp_boost_10").unwrap());
        assert_eq!(xp.current().unwrap(), 120);
    }

    #[test]
    fn test_unmet_prerequisites_change_nothing() {
        let (skills, xp, _) = tree();
        xp.award(500).unwrap();

        assert!(!skills.can_purchase("xp_combo").unwrap());
        assert!(!skills.purchase("xp_combo").unwrap());
        assert_eq!(xp.current().unwrap(), 500);
        assert!(skills.purchased_ids().unwrap().is_empty());
    }

    #[test]
    fn test_multipliers_compose() {
        let (skills, xp, _) = tree();
        xp.award(200).unwrap();
        assert!(skills.purchase("xp_boost_10").unwrap());
        assert!(skills.purchase("xp_combo").unwrap());
        assert!((skills.xp_multiplier().unwrap() - 1.375).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_skill() {
        let (skills, xp, _) = tree();
        xp.award(500).unwrap();
        assert!(!skills.can_purchase("fly").unwrap());
        assert!(!skills.purchase("fly").unwrap());
        assert!(!skills.force_unlock("fly").unwrap());
    }

    #[test]
    fn test_pet_feeding_cost() {
        let (skills, _, _) = tree();
        assert_eq!(skills.pet_feeding_cost().unwrap(), 5);
        skills.force_unlock("pet_discount").unwrap();
        assert_eq!(skills.pet_feeding_cost().unwrap(), 2);
    }

    #[test]
    fn test_force_unlock_notifies() {
        let (skills, xp, _) = tree();
        let mut rx = skills.subscribe();

        assert!(skills.force_unlock("pet_talent").unwrap());
        assert_eq!(
            rx.try_recv().unwrap(),
            SkillEvent::ForceUnlocked { id: "pet_talent" }
        );
        assert_eq!(xp.current().unwrap(), 0);
        assert!(skills.is_purchased("pet_talent").unwrap());
    }

    #[test]
    fn test_persisted_arrays_are_sorted() {
        let store = Store::in_memory();
        let skills = SkillTree::new(
            store.clone(),
            GemLedger::new(store.clone()),
            XpLedger::new(store.clone()),
        );
        skills.force_unlock("xp_combo").unwrap();
        skills.force_unlock("forgive_retry").unwrap();

        let raw = store.get_raw(StorageKey::Skills).unwrap().unwrap();
        assert_eq!(
            raw,
            r#"{"unlockedSkills":["forgive_retry","xp_combo"],"purchasedSkills":["forgive_retry","xp_combo"],"skillPoints":0}"#
        );
    }
}
