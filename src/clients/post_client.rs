use crate::model::{Post, PostCreate, PostId, SubredditId, UserId};
use crate::post_actor::{PostError, PostRequest, Reply};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

/// Client for interacting with the Post actor.
///
/// Every call is bounded by the request timeout. A timed-out call returns
/// [`PostError::Timeout`], but the actor is not interrupted: it finishes the request
/// (including any store write) and its reply is discarded.
#[derive(Clone)]
pub struct PostClient {
    sender: mpsc::Sender<PostRequest>,
    timeout: Duration,
}

impl PostClient {
    pub fn new(sender: mpsc::Sender<PostRequest>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Same mailbox, different per-call timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            sender: self.sender.clone(),
            timeout,
        }
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> PostRequest) -> Result<T, PostError> {
        let (respond_to, response) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(make(respond_to))
                .await
                .map_err(|_| PostError::ActorCommunicationError("Actor closed".into()))?;
            response.await.map_err(|_| {
                PostError::ActorCommunicationError("Actor dropped response channel".into())
            })?
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "Request timed out");
                Err(PostError::Timeout(self.timeout))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn create_post(&self, params: PostCreate) -> Result<Post, PostError> {
        debug!("Sending request");
        self.request(|respond_to| PostRequest::CreatePost { params, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: PostId) -> Result<Post, PostError> {
        debug!("Sending request");
        self.request(|respond_to| PostRequest::GetPost { post_id, respond_to })
            .await
    }

    /// All posts of a subreddit, newest first, read from the store.
    #[instrument(skip(self))]
    pub async fn subreddit_posts(&self, subreddit_id: SubredditId) -> Result<Vec<Post>, PostError> {
        debug!("Sending request");
        self.request(|respond_to| PostRequest::GetSubredditPosts {
            subreddit_id,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn vote(&self, post_id: PostId, voter_id: UserId, is_upvote: bool) -> Result<Post, PostError> {
        debug!("Sending request");
        self.request(|respond_to| PostRequest::VotePost {
            post_id,
            voter_id,
            is_upvote,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn user_feed(&self, user_id: UserId, limit: usize) -> Result<Vec<Post>, PostError> {
        debug!("Sending request");
        self.request(|respond_to| PostRequest::GetUserFeed {
            user_id,
            limit,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, PostError> {
        debug!("Sending request");
        self.request(|respond_to| PostRequest::GetRecentPosts { limit, respond_to })
            .await
    }

    /// Number of posts resident in the actor's cache.
    #[instrument(skip(self))]
    pub async fn counts(&self) -> Result<usize, PostError> {
        self.request(|respond_to| PostRequest::GetCounts { respond_to })
            .await
    }
}
