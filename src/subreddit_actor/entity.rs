//! Entity trait implementation for the Subreddit domain type.

use super::SubredditError;
use crate::framework::ActorEntity;
use crate::model::{Subreddit, SubredditCreate, SubredditId, SubredditUpdate, UserId};
use crate::store::{Collection, DocumentStore};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::debug;

/// Membership changes. Both return the subreddit as committed.
#[derive(Debug, Clone, PartialEq)]
pub enum SubredditAction {
    Join(UserId),
    Leave(UserId),
}

impl Subreddit {
    /// Persists `next` and only then replaces `self` with it.
    async fn commit(&mut self, next: Subreddit, store: &Arc<dyn DocumentStore>) -> Result<(), SubredditError> {
        store.upsert(Collection::Subreddits, next.to_document()?).await?;
        *self = next;
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Subreddit {
    type Id = SubredditId;
    type Create = SubredditCreate;
    type Update = SubredditUpdate;
    type Action = SubredditAction;
    type ActionResult = Subreddit;
    type Context = Arc<dyn DocumentStore>;
    type Error = SubredditError;

    fn id(&self) -> &SubredditId {
        &self.id
    }

    fn from_create_params(id: SubredditId, params: SubredditCreate) -> Result<Self, SubredditError> {
        if params.name.trim().is_empty() {
            return Err(SubredditError::ValidationError("name must not be empty".into()));
        }
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            creator_id: params.creator_id,
            members: vec![params.creator_id],
            created_at: Utc::now().trunc_subsecs(3),
        })
    }

    async fn on_create(&mut self, store: &Self::Context) -> Result<(), SubredditError> {
        store.upsert(Collection::Subreddits, self.to_document()?).await?;
        Ok(())
    }

    async fn on_update(&mut self, update: SubredditUpdate, store: &Self::Context) -> Result<(), SubredditError> {
        let mut next = self.clone();
        if let Some(description) = update.description {
            next.description = description;
        }
        self.commit(next, store).await
    }

    async fn handle_action(
        &mut self,
        action: SubredditAction,
        store: &Self::Context,
    ) -> Result<Subreddit, SubredditError> {
        match action {
            SubredditAction::Join(user) => {
                if self.is_member(&user) {
                    debug!(subreddit_id = %self.id, %user, "Already a member");
                    return Ok(self.clone());
                }
                let mut next = self.clone();
                next.members.push(user);
                self.commit(next, store).await?;
            }
            SubredditAction::Leave(user) => {
                if !self.is_member(&user) {
                    return Ok(self.clone());
                }
                let mut next = self.clone();
                next.members.retain(|m| *m != user);
                self.commit(next, store).await?;
            }
        }
        Ok(self.clone())
    }
}
