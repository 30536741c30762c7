use super::{SubredditId, UserId};
use chrono::{DateTime, Utc};

/// A community that posts are filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Subreddit {
    pub id: SubredditId,
    pub name: String,
    pub description: String,
    pub creator_id: UserId,
    /// Member ids in join order, starting with the creator.
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new subreddit.
#[derive(Debug, Clone)]
pub struct SubredditCreate {
    pub name: String,
    pub description: String,
    pub creator_id: UserId,
}

/// Payload for updating an existing subreddit.
#[derive(Debug, Clone, Default)]
pub struct SubredditUpdate {
    pub description: Option<String>,
}

impl Subreddit {
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }
}
