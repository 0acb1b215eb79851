//! Friend, message, and profile commands

use anyhow::{bail, Result};
use chrono::{Local, TimeZone};

use questlog::domain::{Friend, Profile, YOU};
use questlog::social::{FriendList, MessageLog, UserDirectory};
use questlog::store::StorageKey;

use super::AppContext;
use crate::commands::{FriendCommands, MessageCommands, ProfileCommands};

pub fn friends_command(ctx: &AppContext, command: Option<FriendCommands>) -> Result<()> {
    let friends = FriendList::new(ctx.store.clone());

    match command.unwrap_or(FriendCommands::List) {
        FriendCommands::List => {
            let list = friends.list()?;
            if list.is_empty() {
                println!("No friends yet. Add one with `questlog friends add <username>`.");
                return Ok(());
            }
            println!("Friends ({}):\n", list.len());
            for friend in list {
                println!("  {} {}", friend.avatar, friend.id);
            }
        }
        FriendCommands::Add { username, hashtag } => {
            let friend = friends.add(&username, hashtag.as_deref())?;
            println!("Added {}", friend.id);
            for id in ctx.rewards.check_medals()? {
                let def = id.def();
                println!("  {} Medal earned: {}", def.icon, def.name);
            }
        }
        FriendCommands::Remove { id } => {
            if friends.remove(&id)? {
                println!("Removed {}", id);
            } else {
                println!("{} is not in your friends list.", id);
            }
        }
        FriendCommands::Register { username, hashtag } => {
            if UserDirectory::new(ctx.store.clone()).register(&username, &hashtag)? {
                println!("Registered {}#{}", username.trim(), hashtag.trim());
            } else {
                println!("{}#{} is already registered.", username.trim(), hashtag.trim());
            }
        }
    }

    Ok(())
}

pub fn messages_command(ctx: &AppContext, command: Option<MessageCommands>) -> Result<()> {
    let log = MessageLog::new(ctx.store.clone());

    match command.unwrap_or(MessageCommands::List) {
        MessageCommands::List => {
            let conversations = log.conversations()?;
            if conversations.is_empty() {
                println!("No conversations.");
            }
            for conv in conversations {
                let who = if conv.last_message.from == YOU { "You: " } else { "" };
                println!(
                    "  {} {:<20} {}{}",
                    format_time(conv.last_message.timestamp),
                    conv.friend.id,
                    who,
                    conv.last_message.text
                );
            }
        }
        MessageCommands::Show { friend } => {
            let id = resolve_friend(ctx, &friend)?;
            for message in log.conversation(&id)? {
                println!(
                    "  {} {}: {}",
                    format_time(message.timestamp),
                    message.from,
                    message.text
                );
            }
        }
        MessageCommands::Send { friend, text } => {
            let id = resolve_friend(ctx, &friend)?;
            if log.send(&id, &text)?.is_none() {
                println!("Nothing to send.");
            }
        }
        MessageCommands::Delete { friend } => {
            let id = resolve_friend(ctx, &friend)?;
            let removed = log.delete_conversation(&id)?;
            println!("Deleted {} messages.", removed);
        }
    }

    Ok(())
}

pub fn profile_command(ctx: &AppContext, command: Option<ProfileCommands>) -> Result<()> {
    let mut profile: Profile = ctx.store.load(StorageKey::Profile)?;

    if let Some(ProfileCommands::Set {
        username,
        hashtag,
        avatar,
    }) = command
    {
        if let Some(username) = username {
            if username.trim().is_empty() {
                bail!("Username is required");
            }
            profile.username = username.trim().to_string();
        }
        if let Some(hashtag) = hashtag {
            profile.hashtag = hashtag.trim().to_string();
        }
        if let Some(avatar) = avatar {
            profile.avatar = avatar;
        }
        ctx.store.save(StorageKey::Profile, &profile)?;
    }

    println!("{} {}#{}", profile.avatar, profile.username, profile.hashtag);
    Ok(())
}

/// Accept a friend id or a bare username of a current friend
fn resolve_friend(ctx: &AppContext, input: &str) -> Result<String> {
    let ids = FriendList::new(ctx.store.clone()).ids()?;
    if ids.iter().any(|id| id == input) {
        return Ok(input.to_string());
    }

    let wanted = Friend::make_id(input, "");
    let matches: Vec<&String> = ids.iter().filter(|id| id.starts_with(&wanted)).collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("{} is not in your friends list", input),
        _ => bail!("'{}' matches several friends, use username#hashtag", input),
    }
}

fn format_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
