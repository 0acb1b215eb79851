//! Leaderboard command

use anyhow::Result;

use questlog::domain::Profile;
use questlog::leaderboard::{
    time_to_next_reset, watch_countdown, Leaderboard, LocalPlayer, Standings, TimeToReset,
    PLAYER_ID,
};
use questlog::social::FriendList;
use questlog::store::StorageKey;

use super::AppContext;

pub fn leaderboard_command(ctx: &AppContext, friends_only: bool, json: bool) -> Result<()> {
    let standings = current_standings(ctx, friends_only)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&standings.entries)?);
        return Ok(());
    }

    print_standings(&standings, friends_only, time_to_next_reset());
    Ok(())
}

/// Reprint the standings every refresh interval until Ctrl+C
pub async fn leaderboard_watch_command(ctx: &AppContext, friends_only: bool) -> Result<()> {
    let (_countdown, mut next_reset) = watch_countdown(ctx.config.leaderboard.refresh_interval());

    loop {
        let standings = current_standings(ctx, friends_only)?;
        let remaining = *next_reset.borrow_and_update();
        print_standings(&standings, friends_only, remaining);

        tokio::select! {
            changed = next_reset.changed() => { changed?; }
            _ = tokio::signal::ctrl_c() => break,
        }
        println!();
    }
    Ok(())
}

fn current_standings(ctx: &AppContext, friends_only: bool) -> Result<Standings> {
    let profile: Profile = ctx.store.load(StorageKey::Profile)?;
    let xp = ctx.rewards.xp().state()?;
    let player = LocalPlayer::new(&profile, &xp);

    let standings = Leaderboard::new(ctx.store.clone()).refresh(&player)?;
    if friends_only {
        let friend_ids = FriendList::new(ctx.store.clone()).ids()?;
        return Ok(standings.friends_view(&friend_ids));
    }
    Ok(standings)
}

fn print_standings(standings: &Standings, friends_only: bool, next_reset: TimeToReset) {
    println!(
        "{} Leaderboard • Resets monthly • Next reset in {}\n",
        if friends_only { "Friends" } else { "Global" },
        next_reset
    );

    if friends_only && standings.entries.len() <= 1 {
        println!("  No friends on the leaderboard yet!\n");
    }

    for (i, entry) in standings.entries.iter().enumerate() {
        let you = if entry.id == PLAYER_ID { " (You)" } else { "" };
        println!(
            "  #{:<3} {} {:<20} Lv {:<3} {} XP{}",
            i + 1,
            entry.avatar,
            entry.username,
            entry.level,
            entry.xp,
            you
        );
    }

    println!("\nYour rank: #{}", standings.rank);
}
