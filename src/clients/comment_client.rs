use crate::clients::actor_client::ActorClient;
use crate::comment_actor::{CommentAction, CommentEntry, CommentError};
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Comment, CommentCreate, CommentEdit, CommentId, PostId, UserId};
use crate::post_actor::VoteDirection;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Comment actor.
#[derive(Clone)]
pub struct CommentClient {
    inner: ResourceClient<CommentEntry>,
}

impl CommentClient {
    pub fn new(inner: ResourceClient<CommentEntry>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<CommentEntry> for CommentClient {
    type Error = CommentError;

    fn inner(&self) -> &ResourceClient<CommentEntry> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<CommentError>() {
            Ok(comment_error) => comment_error,
            Err(FrameworkError::NotFound(id)) => CommentError::NotFound(id),
            Err(other) => CommentError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl CommentClient {
    /// Comments on a post, or replies when `parent_id` is set.
    #[instrument(skip(self))]
    pub async fn create_comment(&self, comment: CommentCreate) -> Result<CommentId, CommentError> {
        debug!("Sending request");
        self.inner.create(comment).await.map_err(Self::map_error)
    }

    /// Fetches a comment, treating absence as [`CommentError::NotFound`].
    #[instrument(skip(self))]
    pub async fn get_comment(&self, id: CommentId) -> Result<Comment, CommentError> {
        self.get(id)
            .await?
            .map(|entry| entry.comment)
            .ok_or_else(|| CommentError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn edit_comment(&self, id: CommentId, edit: CommentEdit) -> Result<Comment, CommentError> {
        debug!("Sending request");
        self.inner
            .update(id, edit)
            .await
            .map(|entry| entry.comment)
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn vote(&self, id: CommentId, voter_id: UserId, is_upvote: bool) -> Result<Comment, CommentError> {
        debug!("Sending request");
        let action = CommentAction::Vote {
            voter_id,
            direction: VoteDirection::from_upvote(is_upvote),
        };
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    /// Every comment on a post, replies included, oldest first.
    #[instrument(skip(self))]
    pub async fn post_comments(&self, post_id: PostId) -> Result<Vec<Comment>, CommentError> {
        debug!("Sending request");
        let mut comments: Vec<Comment> = self
            .inner
            .list()
            .await
            .map_err(Self::map_error)?
            .into_iter()
            .map(|entry| entry.comment)
            .filter(|comment| comment.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}
