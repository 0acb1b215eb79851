use serde::{Deserialize, Serialize};

use super::social::DEFAULT_AVATAR;

/// The local player's public profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_hashtag")]
    pub hashtag: String,

    #[serde(default = "default_avatar")]
    pub avatar: String,
}

fn default_username() -> String {
    "Player".to_string()
}

fn default_hashtag() -> String {
    "1000".to_string()
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            username: default_username(),
            hashtag: default_hashtag(),
            avatar: default_avatar(),
        }
    }
}
