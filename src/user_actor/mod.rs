//! Identity actor: user accounts and their karma.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;

use crate::clients::UserClient;
use crate::framework::ResourceActor;
use crate::model::{User, UserId};
use crate::store::{Collection, DocumentStore, Query, StoreError};
use tracing::warn;

/// Creates a new User actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(capacity, UserId::new);
    let client = UserClient::new(generic_client);

    (actor, client)
}

/// Reads every user document for seeding the actor. Undecodable documents are skipped.
pub async fn load(store: &dyn DocumentStore) -> Result<Vec<User>, StoreError> {
    let docs = store.find(Collection::Users, Query::all()).await?;
    Ok(docs
        .into_iter()
        .filter_map(|doc| match User::from_document(doc) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable user document");
                None
            }
        })
        .collect())
}
