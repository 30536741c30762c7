//! Error types for the Subreddit actor.

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubredditError {
    #[error("Subreddit not found: {0}")]
    NotFound(String),

    #[error("Subreddit validation error: {0}")]
    ValidationError(String),

    #[error("Subreddit storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
