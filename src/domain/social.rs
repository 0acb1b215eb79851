use serde::{Deserialize, Serialize};

/// Sender/recipient marker for the local user in message records
pub const YOU: &str = "You";

/// Avatar shown for friends without profile data
pub const DEFAULT_AVATAR: &str = "👤";

/// Opaque `username#hashtag` key
pub type FriendId = String;

/// A friend entry reconstructed from its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: FriendId,
    pub username: String,
    pub hashtag: String,
    pub avatar: String,
}

impl Friend {
    /// Build the canonical friend id: lowercased username with whitespace
    /// runs replaced by `_`, then `#hashtag`
    pub fn make_id(username: &str, hashtag: &str) -> FriendId {
        let name = username
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();
        format!("{}#{}", name, hashtag.trim())
    }

    /// Rebuild a friend from its id (friends are persisted as ids only)
    pub fn from_id(id: &str) -> Self {
        let (username, hashtag) = id.split_once('#').unwrap_or((id, ""));
        Self {
            id: id.to_string(),
            username: username.to_string(),
            hashtag: hashtag.to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
        }
    }
}

/// A chat message between the local user and a friend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Friend id or [`YOU`]
    pub from: String,
    /// Friend id or [`YOU`]
    pub to: String,
    pub text: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl Message {
    /// Whether this message belongs to the conversation with `friend_id`
    pub fn involves(&self, friend_id: &str) -> bool {
        (self.from == YOU && self.to == friend_id) || (self.from == friend_id && self.to == YOU)
    }

    /// The non-local party of the message
    pub fn counterpart(&self) -> &str {
        if self.from == YOU { &self.to } else { &self.from }
    }
}

/// Known account in the local user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub hashtag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id() {
        assert_eq!(Friend::make_id("Ada  Lovelace", "42"), "ada_lovelace#42");
        assert_eq!(Friend::make_id("bob", " 7 "), "bob#7");
    }

    #[test]
    fn test_from_id() {
        let friend = Friend::from_id("ada_lovelace#42");
        assert_eq!(friend.username, "ada_lovelace");
        assert_eq!(friend.hashtag, "42");
        assert_eq!(friend.avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn test_message_involves() {
        let outgoing = Message {
            id: "1".into(),
            from: YOU.into(),
            to: "ada#1".into(),
            text: "hi".into(),
            timestamp: 1,
        };
        let incoming = Message {
            id: "2".into(),
            from: "ada#1".into(),
            to: YOU.into(),
            text: "hey".into(),
            timestamp: 2,
        };
        assert!(outgoing.involves("ada#1"));
        assert!(incoming.involves("ada#1"));
        assert!(!incoming.involves("bob#2"));
        assert_eq!(incoming.counterpart(), "ada#1");
    }
}
