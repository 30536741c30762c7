use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{User, UserCreate, UserId, UserUpdate};
use crate::user_actor::{UserAction, UserActionResult, UserError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<UserError>() {
            Ok(user_error) => user_error,
            Err(FrameworkError::NotFound(id)) => UserError::NotFound(id),
            Err(other) => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl UserClient {
    #[instrument(skip(self))]
    pub async fn register_user(&self, user: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(user).await.map_err(Self::map_error)
    }

    /// Fetches a user, treating absence as [`UserError::NotFound`].
    #[instrument(skip(self))]
    pub async fn lookup_user(&self, id: UserId) -> Result<User, UserError> {
        self.get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Adjusts karma and waits for the new total.
    #[instrument(skip(self))]
    pub async fn adjust_karma(&self, id: UserId, delta: i64) -> Result<i64, UserError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, UserAction::AdjustKarma(delta))
            .await
            .map_err(Self::map_error)?
        {
            UserActionResult::Karma(karma) => Ok(karma),
        }
    }

    /// Fire-and-forget karma adjustment. Returns as soon as the message is queued.
    #[instrument(skip(self))]
    pub fn update_karma(&self, id: UserId, delta: i64) -> Result<(), UserError> {
        self.inner
            .tell(id, UserAction::AdjustKarma(delta))
            .map_err(Self::map_error)
    }
}
