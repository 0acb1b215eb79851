//! Core domain types for Questlog

mod calendar;
mod profile;
mod social;
mod task;

pub use calendar::{DayKey, EventsByDay};
pub use profile::Profile;
pub use social::{Friend, FriendId, Message, UserRecord, DEFAULT_AVATAR, YOU};
pub use task::{NewTask, Task, TaskId, TaskPatch};
