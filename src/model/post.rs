use super::{SubredditId, UserId, PostId};
use chrono::{DateTime, SubsecRound, Utc};

/// A post as held by the content actor's cache.
///
/// `karma` always equals `upvotes - downvotes` for a post that has been committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub subreddit_id: SubredditId,
    pub subreddit_name: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub karma: i64,
}

/// Payload for creating a new post.
#[derive(Debug, Clone)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub subreddit_id: SubredditId,
}

impl Post {
    /// Builds a fresh post with zeroed counters.
    ///
    /// The timestamp is truncated to milliseconds, which is what the store keeps.
    pub fn new(
        create: PostCreate,
        author_username: impl Into<String>,
        subreddit_name: impl Into<String>,
    ) -> Self {
        Self {
            id: PostId::new(),
            title: create.title,
            content: create.content,
            author_id: create.author_id,
            author_username: author_username.into(),
            subreddit_id: create.subreddit_id,
            subreddit_name: subreddit_name.into(),
            created_at: Utc::now().trunc_subsecs(3),
            upvotes: 0,
            downvotes: 0,
            karma: 0,
        }
    }

    /// Applies counter deltas and recomputes karma from the counters.
    pub fn apply_deltas(&mut self, upvotes: i64, downvotes: i64) {
        self.upvotes += upvotes;
        self.downvotes += downvotes;
        self.karma = self.upvotes - self.downvotes;
    }
}
