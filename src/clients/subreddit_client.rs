use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Subreddit, SubredditCreate, SubredditId, SubredditUpdate, UserId};
use crate::subreddit_actor::{SubredditAction, SubredditError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Subreddit actor.
#[derive(Clone)]
pub struct SubredditClient {
    inner: ResourceClient<Subreddit>,
}

impl SubredditClient {
    pub fn new(inner: ResourceClient<Subreddit>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Subreddit> for SubredditClient {
    type Error = SubredditError;

    fn inner(&self) -> &ResourceClient<Subreddit> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<SubredditError>() {
            Ok(subreddit_error) => subreddit_error,
            Err(FrameworkError::NotFound(id)) => SubredditError::NotFound(id),
            Err(other) => SubredditError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl SubredditClient {
    #[instrument(skip(self))]
    pub async fn create_subreddit(&self, subreddit: SubredditCreate) -> Result<SubredditId, SubredditError> {
        debug!("Sending request");
        self.inner.create(subreddit).await.map_err(Self::map_error)
    }

    /// Fetches a subreddit, treating absence as [`SubredditError::NotFound`].
    #[instrument(skip(self))]
    pub async fn lookup_subreddit(&self, id: SubredditId) -> Result<Subreddit, SubredditError> {
        self.get(id)
            .await?
            .ok_or_else(|| SubredditError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_subreddit(
        &self,
        id: SubredditId,
        update: SubredditUpdate,
    ) -> Result<Subreddit, SubredditError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Adds `user` to the members. Joining twice is a no-op.
    #[instrument(skip(self))]
    pub async fn join(&self, id: SubredditId, user: UserId) -> Result<Subreddit, SubredditError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, SubredditAction::Join(user))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn leave(&self, id: SubredditId, user: UserId) -> Result<Subreddit, SubredditError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, SubredditAction::Leave(user))
            .await
            .map_err(Self::map_error)
    }
}
