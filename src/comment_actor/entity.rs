//! Entity trait implementation for comments.
//!
//! The actor keeps each comment next to its vote ledger. A comment is only created once
//! its author, its post and (for a reply) its parent have been found, and every change is
//! written to the `comments` collection before the in-memory copy moves.

use super::CommentError;
use crate::clients::{PostClient, UserClient};
use crate::framework::ActorEntity;
use crate::model::{Comment, CommentCreate, CommentEdit, CommentId, PostId, UserId};
use crate::post_actor::{PostError, VoteDirection, VoteLedger};
use crate::store::{fields, Collection, DocumentStore};
use crate::user_actor::UserError;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Dependencies of the comment actor, injected when it starts.
#[derive(Clone)]
pub struct CommentContext {
    pub store: Arc<dyn DocumentStore>,
    pub users: UserClient,
    pub posts: PostClient,
    /// Bound on the author lookup. Post lookups use the post client's own timeout.
    pub lookup_timeout: Duration,
}

impl CommentContext {
    async fn check_author(&self, id: UserId) -> Result<(), CommentError> {
        match tokio::time::timeout(self.lookup_timeout, self.users.lookup_user(id)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(UserError::NotFound(_))) => {
                Err(CommentError::DependencyNotFound(format!("user {id}")))
            }
            Ok(Err(e)) => Err(CommentError::DependencyUnavailable(format!("user lookup: {e}"))),
            Err(_) => Err(CommentError::DependencyUnavailable(format!(
                "user lookup timed out after {:?}",
                self.lookup_timeout
            ))),
        }
    }

    async fn check_post(&self, id: PostId) -> Result<(), CommentError> {
        match self.posts.get_post(id).await {
            Ok(_) => Ok(()),
            Err(PostError::NotFound(_)) => Err(CommentError::DependencyNotFound(format!("post {id}"))),
            Err(e) => Err(CommentError::DependencyUnavailable(format!("post lookup: {e}"))),
        }
    }

    /// The parent is read from the store, where every comment lands before it is cached.
    async fn check_parent(&self, parent_id: CommentId, post_id: PostId) -> Result<(), CommentError> {
        let doc = self
            .store
            .find_by_id(Collection::Comments, &parent_id.to_string())
            .await?
            .ok_or_else(|| CommentError::DependencyNotFound(format!("parent comment {parent_id}")))?;
        let parent = Comment::from_document(doc)?;
        if parent.post_id != post_id {
            return Err(CommentError::ValidationError(format!(
                "parent comment {parent_id} belongs to post {}",
                parent.post_id
            )));
        }
        Ok(())
    }
}

/// A comment as held by the actor: the comment plus every vote cast on it.
#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub votes: VoteLedger,
}

impl From<Comment> for CommentEntry {
    fn from(comment: Comment) -> Self {
        Self {
            comment,
            votes: VoteLedger::default(),
        }
    }
}

/// Resource-specific operations on a comment.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentAction {
    Vote {
        voter_id: UserId,
        direction: VoteDirection,
    },
}

fn non_empty(content: String) -> Result<String, CommentError> {
    if content.trim().is_empty() {
        return Err(CommentError::ValidationError("content must not be empty".into()));
    }
    Ok(content)
}

#[async_trait]
impl ActorEntity for CommentEntry {
    type Id = CommentId;
    type Create = CommentCreate;
    type Update = CommentEdit;
    type Action = CommentAction;
    type ActionResult = Comment;
    type Context = CommentContext;
    type Error = CommentError;

    fn id(&self) -> &CommentId {
        &self.comment.id
    }

    fn from_create_params(id: CommentId, mut params: CommentCreate) -> Result<Self, CommentError> {
        params.content = non_empty(params.content)?;
        Ok(Comment::new(id, params).into())
    }

    async fn on_create(&mut self, ctx: &CommentContext) -> Result<(), CommentError> {
        let comment = &self.comment;
        ctx.check_author(comment.author_id).await?;
        ctx.check_post(comment.post_id).await?;
        if let Some(parent_id) = comment.parent_id {
            ctx.check_parent(parent_id, comment.post_id).await?;
        }
        ctx.store
            .insert(Collection::Comments, comment.to_document()?)
            .await?;
        Ok(())
    }

    async fn on_update(&mut self, edit: CommentEdit, ctx: &CommentContext) -> Result<(), CommentError> {
        if edit.editor_id != self.comment.author_id {
            return Err(CommentError::Forbidden(format!(
                "user {} did not write comment {}",
                edit.editor_id, self.comment.id
            )));
        }

        let mut next = self.comment.clone();
        next.content = non_empty(edit.content)?;
        next.updated_at = Utc::now().trunc_subsecs(3);
        ctx.store
            .upsert(Collection::Comments, next.to_document()?)
            .await?;
        self.comment = next;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CommentAction,
        ctx: &CommentContext,
    ) -> Result<Comment, CommentError> {
        match action {
            CommentAction::Vote {
                voter_id,
                direction,
            } => {
                let comment_id = self.comment.id;
                let Some(deltas) = self.votes.plan(&voter_id, direction) else {
                    return Err(CommentError::Duplicate(comment_id));
                };

                ctx.store
                    .increment(
                        Collection::Comments,
                        &comment_id.to_string(),
                        &[
                            (fields::UPVOTES, deltas.upvotes),
                            (fields::DOWNVOTES, deltas.downvotes),
                            (fields::KARMA, deltas.karma()),
                        ],
                    )
                    .await?;

                self.comment.apply_deltas(deltas.upvotes, deltas.downvotes);
                self.votes.record(voter_id, direction);

                let author_id = self.comment.author_id;
                if let Err(e) = ctx.users.update_karma(author_id, direction.karma_delta()) {
                    warn!(%author_id, error = %e, "Karma update dropped");
                }
                debug!(
                    %comment_id,
                    %voter_id,
                    ?direction,
                    karma = self.comment.karma,
                    "Comment vote recorded"
                );
                Ok(self.comment.clone())
            }
        }
    }
}
