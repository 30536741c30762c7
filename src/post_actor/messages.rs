//! Messages accepted by the post actor's mailbox.

use super::PostError;
use crate::model::{Post, PostCreate, PostId, SubredditId, UserId};
use tokio::sync::oneshot;

/// One-shot reply channel for a post request.
pub type Reply<T> = oneshot::Sender<Result<T, PostError>>;

#[derive(Debug)]
pub enum PostRequest {
    /// Self-addressed at construction; loads every stored post into the cache.
    Initialize,
    CreatePost {
        params: PostCreate,
        respond_to: Reply<Post>,
    },
    GetPost {
        post_id: PostId,
        respond_to: Reply<Post>,
    },
    GetSubredditPosts {
        subreddit_id: SubredditId,
        respond_to: Reply<Vec<Post>>,
    },
    VotePost {
        post_id: PostId,
        voter_id: UserId,
        is_upvote: bool,
        respond_to: Reply<Post>,
    },
    GetUserFeed {
        user_id: UserId,
        limit: usize,
        respond_to: Reply<Vec<Post>>,
    },
    GetRecentPosts {
        limit: usize,
        respond_to: Reply<Vec<Post>>,
    },
    GetCounts {
        respond_to: Reply<usize>,
    },
}
