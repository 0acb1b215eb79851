//! CLI command definitions for questlog.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Write a commented default ~/.questlog/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Manage calendar events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Show or change the gem balance
    Gems {
        #[command(subcommand)]
        command: Option<GemCommands>,
    },

    /// Show XP, level, streak, and progress counters
    Xp,

    /// Browse and buy skills
    Skills {
        #[command(subcommand)]
        command: Option<SkillCommands>,
    },

    /// List medals
    Medals,

    /// Roll for a critical hit (does not award anything)
    Roll {
        /// Number of rolls
        #[arg(long, short = 'n', default_value_t = 1)]
        count: u32,
    },

    /// Force critical hits or crate drops
    TestMode {
        /// "critical" or "crate"
        mode: String,
        /// "on" or "off"
        state: String,
    },

    /// Open pending crates
    Crate {
        #[command(subcommand)]
        command: CrateCommands,
    },

    /// Feed the pet (costs gems)
    FeedPet,

    /// Track finished quests
    Quest {
        #[command(subcommand)]
        command: QuestCommands,
    },

    /// Show the monthly leaderboard
    Leaderboard {
        /// Only show you and your friends
        #[arg(long)]
        friends: bool,
        /// Print JSON instead of human output
        #[arg(long, conflicts_with = "watch")]
        json: bool,
        /// Keep refreshing until Ctrl+C ([leaderboard] refresh_interval_secs)
        #[arg(long)]
        watch: bool,
    },

    /// Manage friends
    Friends {
        #[command(subcommand)]
        command: Option<FriendCommands>,
    },

    /// Direct messages with friends
    Messages {
        #[command(subcommand)]
        command: Option<MessageCommands>,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },

    /// Run a focus session
    Focus {
        /// Session length in minutes
        #[arg(long, short = 'm', default_value_t = 25)]
        minutes: u64,
    },

    /// Toggle premium membership
    Premium {
        /// "on" or "off"
        state: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Print JSON instead of human output
        #[arg(long)]
        json: bool,
        /// Hide completed tasks
        #[arg(long)]
        open: bool,
    },
    /// Add a task
    Add {
        title: String,
        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
    /// Edit fields of a task
    Edit {
        /// Task id (a unique prefix is enough)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short = 'd')]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Complete a task and collect rewards
    Done { id: String },
    /// Remove a task
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List events, optionally for one day
    List { date: Option<String> },
    /// Add an event to a day
    Add { date: String, title: String },
    /// Remove an event by its position (0-based) on a day
    Remove { date: String, index: usize },
}

#[derive(Subcommand)]
pub enum GemCommands {
    /// Add gems
    Add { amount: u64 },
    /// Spend gems
    Spend { amount: u64 },
    /// Overwrite the balance
    Set { amount: u64 },
}

#[derive(Subcommand)]
pub enum SkillCommands {
    /// List skills
    List {
        /// Only one tree (forgiveness, xp_mastery, pet_power)
        #[arg(long, short = 't')]
        tree: Option<String>,
    },
    /// Buy a skill
    Buy { id: String },
    /// Unlock a skill for free (dev)
    Unlock { id: String },
}

#[derive(Subcommand)]
pub enum CrateCommands {
    /// Open one pending crate
    Open,
}

#[derive(Subcommand)]
pub enum QuestCommands {
    /// Record a finished quest
    Done,
}

#[derive(Subcommand)]
pub enum FriendCommands {
    /// List friends
    List,
    /// Add a friend from the user directory
    Add {
        username: String,
        #[arg(long)]
        hashtag: Option<String>,
    },
    /// Remove a friend by id (username#hashtag)
    Remove { id: String },
    /// Register a user in the local directory
    Register { username: String, hashtag: String },
}

#[derive(Subcommand)]
pub enum MessageCommands {
    /// List conversations
    List,
    /// Show the conversation with a friend
    Show { friend: String },
    /// Send a message
    Send { friend: String, text: String },
    /// Delete the conversation with a friend
    Delete { friend: String },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        hashtag: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}
