use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod cli;
mod commands;

use commands::{Commands, CrateCommands, QuestCommands};

#[derive(Parser)]
#[command(name = "questlog")]
#[command(about = "Questlog - turn your to-do list into a game")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.questlog/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = match cli.command {
        Some(Commands::Init { force }) => {
            return cli::init::init_command(cli.config, force);
        }
        Some(command) => command,
        None => Commands::Xp,
    };

    let ctx = cli::AppContext::open(cli.config.as_deref())?;

    match command {
        // handled before opening the store
        Commands::Init { .. } => {}
        Commands::Task { command } => cli::task::task_command(&ctx, command)?,
        Commands::Event { command } => cli::task::event_command(&ctx, command)?,
        Commands::Gems { command } => cli::rewards::gems_command(&ctx, command)?,
        Commands::Xp => cli::rewards::xp_command(&ctx)?,
        Commands::Skills { command } => cli::rewards::skills_command(&ctx, command)?,
        Commands::Medals => cli::rewards::medals_command(&ctx)?,
        Commands::Roll { count } => cli::rewards::roll_command(&ctx, count)?,
        Commands::TestMode { mode, state } => {
            cli::rewards::test_mode_command(&ctx, &mode, &state)?
        }
        Commands::Crate {
            command: CrateCommands::Open,
        } => cli::rewards::crate_open_command(&ctx).await?,
        Commands::FeedPet => cli::rewards::feed_pet_command(&ctx)?,
        Commands::Quest {
            command: QuestCommands::Done,
        } => cli::rewards::quest_done_command(&ctx)?,
        Commands::Leaderboard {
            friends,
            json,
            watch,
        } => {
            if watch {
                cli::leaderboard::leaderboard_watch_command(&ctx, friends).await?
            } else {
                cli::leaderboard::leaderboard_command(&ctx, friends, json)?
            }
        }
        Commands::Friends { command } => cli::social::friends_command(&ctx, command)?,
        Commands::Messages { command } => cli::social::messages_command(&ctx, command)?,
        Commands::Profile { command } => cli::social::profile_command(&ctx, command)?,
        Commands::Focus { minutes } => cli::rewards::focus_command(&ctx, minutes).await?,
        Commands::Premium { state } => cli::rewards::premium_command(&ctx, &state)?,
    }

    Ok(())
}
