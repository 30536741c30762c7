use super::{CommentId, PostId, UserId};
use chrono::{DateTime, SubsecRound, Utc};

/// A comment on a post, or a reply to another comment on the same post.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    /// Set for replies. The parent always belongs to the same post.
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    /// Last edit; equals `created_at` until the comment is edited.
    pub updated_at: DateTime<Utc>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub karma: i64,
}

/// Payload for creating a new comment.
#[derive(Debug, Clone)]
pub struct CommentCreate {
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
}

/// Replaces a comment's content. Only the author may edit.
#[derive(Debug, Clone)]
pub struct CommentEdit {
    pub editor_id: UserId,
    pub content: String,
}

impl Comment {
    pub fn new(id: CommentId, create: CommentCreate) -> Self {
        let now = Utc::now().trunc_subsecs(3);
        Self {
            id,
            content: create.content,
            author_id: create.author_id,
            post_id: create.post_id,
            parent_id: create.parent_id,
            created_at: now,
            updated_at: now,
            upvotes: 0,
            downvotes: 0,
            karma: 0,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Applies counter deltas and recomputes karma from the counters.
    pub fn apply_deltas(&mut self, upvotes: i64, downvotes: i64) {
        self.upvotes += upvotes;
        self.downvotes += downvotes;
        self.karma = self.upvotes - self.downvotes;
    }
}
