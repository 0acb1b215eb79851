//! Gem, XP, skill, medal, crate, and focus commands

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Result};

use questlog::rewards::critical::TestMode;
use questlog::rewards::skills::find_skill;
use questlog::rewards::{CrateOpener, CratePhase, RewardEvent, Tree, BRONZE_REWARDS, SKILLS};
use questlog::timer::FocusTimer;

use super::{parse_switch, print_reward_events, AppContext};
use crate::commands::{GemCommands, SkillCommands};

pub fn gems_command(ctx: &AppContext, command: Option<GemCommands>) -> Result<()> {
    let gems = ctx.rewards.gems();

    match command {
        None => {}
        Some(GemCommands::Add { amount }) => {
            gems.add(amount)?;
        }
        Some(GemCommands::Spend { amount }) => {
            if !gems.spend(amount)? {
                println!("Not enough gems.");
            }
        }
        Some(GemCommands::Set { amount }) => gems.set_balance(amount)?,
    }

    println!("💎 {}", gems.balance()?);
    Ok(())
}

pub fn xp_command(ctx: &AppContext) -> Result<()> {
    let xp = ctx.rewards.xp().state()?;
    let progress = ctx.rewards.progress()?;
    let streak = ctx.rewards.streaks().info()?;

    println!("Level {}", xp.level());
    println!("  XP:        {} spendable / {} total", xp.current, xp.total);
    println!("  Gems:      {}", ctx.rewards.gems().balance()?);
    println!(
        "  Streak:    {} days (best {})",
        ctx.rewards.streaks().current_days()?,
        streak.best
    );
    println!("  Tasks:     {}", progress.tasks_completed);
    println!("  Quests:    {}", progress.quests_completed);
    println!("  Focus:     {} min", progress.focus_minutes);
    println!("  Crates:    {}", progress.crates_available);
    if progress.is_premium {
        println!("  Plus member");
    }
    Ok(())
}

pub fn skills_command(ctx: &AppContext, command: Option<SkillCommands>) -> Result<()> {
    let skills = ctx.rewards.skills();

    match command.unwrap_or(SkillCommands::List { tree: None }) {
        SkillCommands::List { tree } => {
            let trees: Vec<Tree> = match tree {
                Some(name) => match Tree::from_str(&name) {
                    Some(tree) => vec![tree],
                    None => bail!("Unknown skill tree: {}", name),
                },
                None => Tree::all().to_vec(),
            };

            println!("XP: {}  💎 {}\n", ctx.rewards.xp().current()?, ctx.rewards.gems().balance()?);
            for tree in trees {
                println!("{}", tree.label());
                for skill in skills.list_by_tree(tree)? {
                    let def = skill.def;
                    let status = if skill.purchased {
                        "owned".to_string()
                    } else if skills.can_purchase(def.id)? {
                        format!("{} {}", def.cost, def.cost_type.as_str())
                    } else {
                        format!("requires {}", def.prerequisites.join(", "))
                    };
                    println!("  {} {:<22} {:<24} {}", def.icon, def.id, def.name, status);
                }
                println!();
            }
        }
        SkillCommands::Buy { id } => {
            let Some(def) = find_skill(&id) else {
                return unknown_skill(&id);
            };
            if skills.purchase(def.id)? {
                println!("{} Purchased {}", def.icon, def.name);
            } else if skills.is_purchased(def.id)? {
                println!("Already purchased.");
            } else if !skills.can_purchase(def.id)? {
                println!("Requires: {}", def.prerequisites.join(", "));
            } else {
                println!("Not enough {} (costs {}).", def.cost_type.as_str(), def.cost);
            }
        }
        SkillCommands::Unlock { id } => {
            if !skills.force_unlock(&id)? {
                return unknown_skill(&id);
            }
            println!("Unlocked {}", id);
        }
    }

    Ok(())
}

fn unknown_skill(id: &str) -> Result<()> {
    match suggest_skill(id) {
        Some(suggestion) => bail!("Unknown skill '{}'. Did you mean '{}'?", id, suggestion),
        None => bail!("Unknown skill '{}'", id),
    }
}

/// Closest skill id by Jaro-Winkler similarity
fn suggest_skill(input: &str) -> Option<&'static str> {
    SKILLS
        .iter()
        .map(|s| (s.id, strsim::jaro_winkler(input, s.id)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

pub fn medals_command(ctx: &AppContext) -> Result<()> {
    let medals = ctx.rewards.medals().all()?;
    let earned = medals.iter().filter(|m| m.earned).count();

    println!("Medals ({}/{}):\n", earned, medals.len());
    for medal in medals {
        let mark = if medal.earned { medal.icon.as_str() } else { "🔒" };
        println!("  {} {:<18} {}", mark, medal.name, medal.description);
    }
    Ok(())
}

pub fn roll_command(ctx: &AppContext, count: u32) -> Result<()> {
    let chances = ctx.rewards.roller().chances()?;
    println!(
        "Chances: {}% critical, {}% crate",
        chances.critical_hit_chance, chances.crate_reward_chance
    );

    for _ in 0..count {
        let roll = ctx.rewards.roller().roll()?;
        println!(
            "  x{}{}{}",
            roll.xp_multiplier,
            if roll.is_critical { " ⚡" } else { "" },
            if roll.crate_reward { " 🎁" } else { "" }
        );
    }
    Ok(())
}

pub fn test_mode_command(ctx: &AppContext, mode: &str, state: &str) -> Result<()> {
    let mode = match mode.to_lowercase().as_str() {
        "critical" => TestMode::Critical,
        "crate" => TestMode::Crate,
        other => bail!("Unknown test mode '{}', expected 'critical' or 'crate'", other),
    };
    let enabled = parse_switch(state)?;
    ctx.rewards.roller().set_test_mode(mode, enabled)?;
    println!(
        "{} test mode {}",
        mode.as_str(),
        if enabled { "on" } else { "off" }
    );
    Ok(())
}

pub async fn crate_open_command(ctx: &AppContext) -> Result<()> {
    let mut opener = CrateOpener::new();
    let mut phases = opener.subscribe();

    if !ctx.rewards.open_crate(&mut opener)? {
        println!("No crates to open.");
        return Ok(());
    }

    loop {
        phases.changed().await?;
        let phase = *phases.borrow_and_update();
        match phase {
            CratePhase::Rolling { index } => {
                print!("\r  🎁 {:<12}", BRONZE_REWARDS[index].to_string());
                std::io::stdout().flush()?;
            }
            CratePhase::Revealed(reward) => println!("\r  🎉 You got {}!   ", reward),
            CratePhase::Closing => {}
            CratePhase::Idle => break,
        }
    }

    let left = ctx.rewards.crates_available()?;
    if left > 0 {
        println!("  {} crates left", left);
    }
    Ok(())
}

pub fn feed_pet_command(ctx: &AppContext) -> Result<()> {
    let cost = ctx.rewards.skills().pet_feeding_cost()?;
    if ctx.rewards.feed_pet()? {
        println!("🐣 Yum! (-{} 💎)", cost);
    } else {
        println!("Not enough gems (feeding costs {}).", cost);
    }
    Ok(())
}

pub fn quest_done_command(ctx: &AppContext) -> Result<()> {
    let medals = ctx.rewards.complete_quest()?;
    println!(
        "📜 Quest complete ({} total)",
        ctx.rewards.progress()?.quests_completed
    );
    for id in medals {
        print_reward_events(&[RewardEvent::MedalEarned(id)]);
    }
    Ok(())
}

pub async fn focus_command(ctx: &AppContext, minutes: u64) -> Result<()> {
    let Some(secs) = focus_seconds(minutes) else {
        bail!("Focus session must be between 1 and {} minutes", u64::MAX / 60);
    };

    let mut timer = FocusTimer::new(Duration::from_secs(secs));
    let mut remaining = timer.subscribe();
    let (done_tx, mut done_rx) = tokio::sync::oneshot::channel();
    timer.start(move |finished| {
        let _ = done_tx.send(finished);
    });
    println!("Focus session started ({} min). Press Ctrl+C to stop.", minutes);

    loop {
        tokio::select! {
            changed = remaining.changed() => {
                changed?;
                let secs = *remaining.borrow_and_update();
                print!("\r  ⏱️  {:02}:{:02} ", secs / 60, secs % 60);
                std::io::stdout().flush()?;
            }
            finished = &mut done_rx => {
                let finished = finished?;
                println!("\n🎉 Focus session complete!");
                for id in ctx.rewards.record_focus(finished)? {
                    let def = id.def();
                    println!("  {} Medal earned: {}", def.icon, def.name);
                }
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                timer.stop();
                println!("\nFocus session stopped with {}s left.", timer.time_left().as_secs());
                break;
            }
        }
    }
    Ok(())
}

/// Session length in seconds; `None` for zero or overflowing minutes
fn focus_seconds(minutes: u64) -> Option<u64> {
    if minutes == 0 {
        return None;
    }
    minutes.checked_mul(60)
}

pub fn premium_command(ctx: &AppContext, state: &str) -> Result<()> {
    let premium = parse_switch(state)?;
    let medals = ctx.rewards.set_premium(premium)?;
    println!("Plus membership {}", if premium { "active" } else { "inactive" });
    for id in medals {
        print_reward_events(&[RewardEvent::MedalEarned(id)]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_skill() {
        assert_eq!(suggest_skill("xp_boost10"), Some("xp_boost_10"));
        assert_eq!(suggest_skill("pet_discont"), Some("pet_discount"));
        assert_eq!(suggest_skill("zzzzzz"), None);
    }

    #[test]
    fn test_quest_done_counts_toward_quest_master() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("[storage]\npath = {:?}\n", dir.path().join("state.db")),
        )
        .unwrap();
        let ctx = AppContext::open(Some(&config_path)).unwrap();

        for _ in 0..10 {
            quest_done_command(&ctx).unwrap();
        }
        assert_eq!(ctx.rewards.progress().unwrap().quests_completed, 10);
        assert!(ctx
            .rewards
            .medals()
            .is_earned(questlog::rewards::MedalId::QuestMaster)
            .unwrap());
    }

    #[test]
    fn test_focus_seconds_rejects_zero_and_overflow() {
        assert_eq!(focus_seconds(25), Some(1500));
        assert_eq!(focus_seconds(0), None);
        assert_eq!(focus_seconds(u64::MAX), None);
        assert_eq!(focus_seconds(u64::MAX / 60), Some(u64::MAX / 60 * 60));
    }
}
