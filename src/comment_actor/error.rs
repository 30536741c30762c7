//! Error types for the Comment actor.

use crate::model::CommentId;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during comment operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommentError {
    /// The requested comment was not found.
    #[error("Comment not found: {0}")]
    NotFound(String),

    /// The comment data provided is invalid.
    #[error("Comment validation error: {0}")]
    ValidationError(String),

    /// Only the author may edit a comment.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The voter already voted in this direction.
    #[error("Duplicate vote on comment {0}")]
    Duplicate(CommentId),

    /// The author, post or parent comment does not exist.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(String),

    /// A lookup to another actor failed or timed out.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// The write-through to the document store failed.
    #[error("Comment storage error: {0}")]
    Storage(#[from] StoreError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
