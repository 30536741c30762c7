//! Content actor: posts, votes and the author-karma side effect.
//!
//! Unlike the collaborator actors this one is hand-written rather than a
//! [`ResourceActor`](crate::framework::ResourceActor): it owns three related maps and
//! talks to the store and to two other actors while handling a message.

pub mod actor;
pub mod error;
pub mod messages;
pub mod votes;

pub use actor::{PostActor, PostDependencies};
pub use error::*;
pub use messages::{PostRequest, Reply};
pub use votes::{VoteDirection, VoteLedger};

use crate::clients::PostClient;
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Creates a new Post actor and its client.
///
/// The actor's first message is its own initialization, so the bulk load runs before any
/// client request is handled. `request_timeout` bounds every client call as well as the
/// actor's own lookups to the user and subreddit actors.
pub fn new(
    capacity: usize,
    request_timeout: Duration,
    store: Arc<dyn DocumentStore>,
) -> (PostActor, PostClient) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    // A fresh channel always has room for one message.
    let _ = sender.try_send(PostRequest::Initialize);

    let actor = PostActor::new(receiver, store, request_timeout);
    let client = PostClient::new(sender, request_timeout);
    (actor, client)
}
