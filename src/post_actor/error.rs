//! Error types for the Post actor.

use crate::model::PostId;
use crate::store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during post operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PostError {
    /// The requested post exists neither in the cache nor in the store.
    #[error("Post not found: {0}")]
    NotFound(PostId),

    /// The author or subreddit a post refers to does not exist.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(String),

    /// The voter already voted in this direction.
    #[error("Duplicate vote on post {post_id}")]
    Duplicate { post_id: PostId },

    /// A store operation failed. The cache was left unchanged.
    #[error("Post storage error: {0}")]
    Storage(#[from] StoreError),

    /// A lookup to another actor failed or timed out.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// The caller stopped waiting. The actor may still complete the request.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Coarse classification of a [`PostError`] for a transport layer to map onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    Duplicate,
    Storage,
    DependencyUnavailable,
    Timeout,
    Internal,
}

impl PostError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PostError::NotFound(_) | PostError::DependencyNotFound(_) => ErrorCode::NotFound,
            PostError::Duplicate { .. } => ErrorCode::Duplicate,
            PostError::Storage(_) => ErrorCode::Storage,
            PostError::DependencyUnavailable(_) => ErrorCode::DependencyUnavailable,
            PostError::Timeout(_) => ErrorCode::Timeout,
            PostError::ActorCommunicationError(_) => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_classify_as_not_found() {
        assert_eq!(
            PostError::DependencyNotFound("user".into()).code(),
            ErrorCode::NotFound
        );
        assert_eq!(PostError::NotFound(PostId::new()).code(), ErrorCode::NotFound);
        assert_eq!(
            PostError::Storage(StoreError::Unavailable("down".into())).code(),
            ErrorCode::Storage
        );
    }
}
