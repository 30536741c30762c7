//! Entity trait implementation for the User domain type.
//!
//! Every mutation is written through to the `users` collection before the in-memory
//! copy changes.

use super::UserError;
use crate::framework::ActorEntity;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use crate::store::{fields, Collection, DocumentStore};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::debug;

/// Resource-specific operations on a user.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Adds `delta` to the user's karma.
    AdjustKarma(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserActionResult {
    Karma(i64),
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = UserAction;
    type ActionResult = UserActionResult;
    type Context = Arc<dyn DocumentStore>;
    type Error = UserError;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, UserError> {
        if params.username.trim().is_empty() {
            return Err(UserError::ValidationError("username must not be empty".into()));
        }
        Ok(Self {
            id,
            username: params.username,
            email: params.email,
            karma: 0,
            created_at: Utc::now().trunc_subsecs(3),
        })
    }

    async fn on_create(&mut self, store: &Self::Context) -> Result<(), UserError> {
        store.upsert(Collection::Users, self.to_document()?).await?;
        Ok(())
    }

    async fn on_update(&mut self, update: UserUpdate, store: &Self::Context) -> Result<(), UserError> {
        let mut next = self.clone();
        if let Some(email) = update.email {
            next.email = email;
        }
        store.upsert(Collection::Users, next.to_document()?).await?;
        *self = next;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: UserAction,
        store: &Self::Context,
    ) -> Result<UserActionResult, UserError> {
        match action {
            UserAction::AdjustKarma(delta) => {
                store
                    .increment(Collection::Users, &self.id.to_string(), &[(fields::KARMA, delta)])
                    .await?;
                self.karma += delta;
                debug!(user_id = %self.id, delta, karma = self.karma, "Karma adjusted");
                Ok(UserActionResult::Karma(self.karma))
            }
        }
    }
}
