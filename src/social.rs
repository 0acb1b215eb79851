//! Friends, the local user directory, and direct messages
//!
//! Friends are persisted as an insertion-ordered, de-duplicated array of
//! `username#hashtag` ids. Messages are a flat log; a conversation is every
//! message between [`YOU`] and one friend.

use chrono::Utc;

use crate::domain::{Friend, FriendId, Message, UserRecord, YOU};
use crate::store::{StorageKey, Store, StoreError};

/// Errors surfaced by friend and message operations
#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("Username is required")]
    EmptyUsername,

    #[error("User not found: {0}. Make sure the username and hashtag are correct.")]
    UserNotFound(String),

    #[error("Already friends with {0}")]
    AlreadyFriends(FriendId),

    #[error("{0} is not in your friends list")]
    NotAFriend(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SocialError>;

/// Accounts known locally, used to validate friend requests
#[derive(Clone)]
pub struct UserDirectory {
    store: Store,
}

impl UserDirectory {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<UserRecord>> {
        Ok(self.store.load(StorageKey::Users)?)
    }

    /// Add an account; `false` if the exact username/hashtag pair exists
    pub fn register(&self, username: &str, hashtag: &str) -> Result<bool> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SocialError::EmptyUsername);
        }

        let mut users = self.list()?;
        let hashtag = hashtag.trim();
        if users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username) && u.hashtag == hashtag)
        {
            return Ok(false);
        }

        users.push(UserRecord {
            username: username.to_string(),
            hashtag: hashtag.to_string(),
        });
        self.store.save(StorageKey::Users, &users)?;
        Ok(true)
    }

    /// Case-insensitive username match; an empty or missing hashtag matches any
    pub fn find(&self, username: &str, hashtag: Option<&str>) -> Result<Option<UserRecord>> {
        let hashtag = hashtag.map(str::trim).filter(|h| !h.is_empty());
        Ok(self.list()?.into_iter().find(|u| {
            u.username.eq_ignore_ascii_case(username.trim())
                && hashtag.is_none_or(|h| u.hashtag == h)
        }))
    }
}

/// The local player's friends
#[derive(Clone)]
pub struct FriendList {
    store: Store,
}

impl FriendList {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Friend ids in insertion order
    pub fn ids(&self) -> std::result::Result<Vec<FriendId>, StoreError> {
        let ids: Vec<FriendId> = self.store.load(StorageKey::Friends)?;
        Ok(dedup(ids))
    }

    pub fn list(&self) -> std::result::Result<Vec<Friend>, StoreError> {
        Ok(self.ids()?.iter().map(|id| Friend::from_id(id)).collect())
    }

    pub fn len(&self) -> std::result::Result<usize, StoreError> {
        Ok(self.ids()?.len())
    }

    pub fn is_empty(&self) -> std::result::Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, id: &str) -> std::result::Result<bool, StoreError> {
        Ok(self.ids()?.iter().any(|f| f == id))
    }

    /// Add a friend found in the user directory. Without a hashtag the first
    /// matching account's hashtag is used.
    pub fn add(&self, username: &str, hashtag: Option<&str>) -> Result<Friend> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SocialError::EmptyUsername);
        }

        let directory = UserDirectory::new(self.store.clone());
        let Some(user) = directory.find(username, hashtag)? else {
            let label = match hashtag.map(str::trim).filter(|h| !h.is_empty()) {
                Some(h) => format!("{}#{}", username, h),
                None => username.to_string(),
            };
            return Err(SocialError::UserNotFound(label));
        };

        let id = Friend::make_id(username, &user.hashtag);
        let mut ids = self.ids()?;
        if ids.contains(&id) {
            return Err(SocialError::AlreadyFriends(id));
        }
        ids.push(id.clone());
        self.store.save(StorageKey::Friends, &ids)?;

        tracing::info!("Added friend {}", id);
        let mut friend = Friend::from_id(&id);
        friend.username = username.to_string();
        Ok(friend)
    }

    /// Remove a friend; `false` if not present
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut ids = self.ids()?;
        let before = ids.len();
        ids.retain(|f| f != id);
        if ids.len() == before {
            return Ok(false);
        }
        self.store.save(StorageKey::Friends, &ids)?;
        Ok(true)
    }
}

fn dedup(ids: Vec<FriendId>) -> Vec<FriendId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Latest message of one conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub friend: Friend,
    pub last_message: Message,
}

/// Persisted direct messages
#[derive(Clone)]
pub struct MessageLog {
    store: Store,
}

impl MessageLog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<Vec<Message>> {
        Ok(self.store.load(StorageKey::Messages)?)
    }

    /// Send `text` to a friend. Blank text is ignored (`Ok(None)`).
    pub fn send(&self, friend_id: &str, text: &str) -> Result<Option<Message>> {
        if !FriendList::new(self.store.clone()).contains(friend_id)? {
            return Err(SocialError::NotAFriend(friend_id.to_string()));
        }
        self.append(YOU, friend_id, text)
    }

    /// Store a message received from a friend
    pub fn receive(&self, friend_id: &str, text: &str) -> Result<Option<Message>> {
        self.append(friend_id, YOU, text)
    }

    fn append(&self, from: &str, to: &str, text: &str) -> Result<Option<Message>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            from: from.to_string(),
            to: to.to_string(),
            text: text.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let mut messages = self.all()?;
        messages.push(message.clone());
        self.store.save(StorageKey::Messages, &messages)?;
        Ok(Some(message))
    }

    /// Messages exchanged with `friend_id`, oldest first
    pub fn conversation(&self, friend_id: &str) -> Result<Vec<Message>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|m| m.involves(friend_id))
            .collect())
    }

    /// Delete every message with `friend_id`; returns how many were removed
    pub fn delete_conversation(&self, friend_id: &str) -> Result<usize> {
        let mut messages = self.all()?;
        let before = messages.len();
        messages.retain(|m| !m.involves(friend_id));
        let removed = before - messages.len();
        if removed > 0 {
            self.store.save(StorageKey::Messages, &messages)?;
        }
        Ok(removed)
    }

    /// One summary per current friend with messages, most recent first
    pub fn conversations(&self) -> Result<Vec<ConversationSummary>> {
        let friends = FriendList::new(self.store.clone()).ids()?;
        let mut latest: Vec<Message> = Vec::new();

        for message in self.all()? {
            let slot = latest
                .iter()
                .position(|m| m.counterpart() == message.counterpart());
            match slot {
                Some(i) if latest[i].timestamp < message.timestamp => latest[i] = message,
                Some(_) => {}
                None => latest.push(message),
            }
        }

        let mut summaries: Vec<ConversationSummary> = latest
            .into_iter()
            .filter(|m| friends.iter().any(|f| f == m.counterpart()))
            .map(|m| ConversationSummary {
                friend: Friend::from_id(m.counterpart()),
                last_message: m,
            })
            .collect();
        summaries.sort_by(|a, b| b.last_message.timestamp.cmp(&a.last_message.timestamp));
        Ok(summaries)
    }
}
