//! Community actor: subreddits and their member lists.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;

use crate::clients::SubredditClient;
use crate::framework::ResourceActor;
use crate::model::{Subreddit, SubredditId};
use crate::store::{Collection, DocumentStore, Query, StoreError};
use tracing::warn;

/// Creates a new Subreddit actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<Subreddit>, SubredditClient) {
    let (actor, generic_client) = ResourceActor::new(capacity, SubredditId::new);
    (actor, SubredditClient::new(generic_client))
}

/// Reads every subreddit document for seeding the actor. Undecodable documents are skipped.
pub async fn load(store: &dyn DocumentStore) -> Result<Vec<Subreddit>, StoreError> {
    let docs = store.find(Collection::Subreddits, Query::all()).await?;
    Ok(docs
        .into_iter()
        .filter_map(|doc| match Subreddit::from_document(doc) {
            Ok(subreddit) => Some(subreddit),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable subreddit document");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ActorClient;
    use crate::model::{SubredditCreate, SubredditUpdate, UserId};
    use crate::store::MemoryStore;
    use std::sync::Arc;

    async fn spawn() -> (Arc<dyn DocumentStore>, crate::clients::SubredditClient) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let (actor, client) = new(8);
        tokio::spawn(actor.run(store.clone()));
        (store, client)
    }

    #[tokio::test]
    async fn creator_is_first_member() {
        let (store, client) = spawn().await;
        let creator = UserId::new();
        let id = client
            .create_subreddit(SubredditCreate {
                name: "rust".into(),
                description: "crabs".into(),
                creator_id: creator,
            })
            .await
            .unwrap();

        let subreddit = client.lookup_subreddit(id).await.unwrap();
        assert_eq!(subreddit.members, vec![creator]);
        assert_eq!(load(store.as_ref()).await.unwrap(), vec![subreddit]);
        assert_eq!(client.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn join_and_leave_write_through() {
        let (store, client) = spawn().await;
        let creator = UserId::new();
        let member = UserId::new();
        let id = client
            .create_subreddit(SubredditCreate {
                name: "golang".into(),
                description: String::new(),
                creator_id: creator,
            })
            .await
            .unwrap();

        client.join(id, member).await.unwrap();
        let twice = client.join(id, member).await.unwrap();
        assert_eq!(twice.members, vec![creator, member]);

        let stored = load(store.as_ref()).await.unwrap();
        assert_eq!(stored[0].members, vec![creator, member]);

        let after = client.leave(id, creator).await.unwrap();
        assert_eq!(after.members, vec![member]);

        let updated = client
            .update_subreddit(id, SubredditUpdate { description: Some("gophers".into()) })
            .await
            .unwrap();
        assert_eq!(updated.description, "gophers");
    }

    #[tokio::test]
    async fn unknown_subreddit_is_not_found() {
        let (_store, client) = spawn().await;
        let missing = SubredditId::new();

        let err = client.lookup_subreddit(missing).await.unwrap_err();
        assert_eq!(err, SubredditError::NotFound(missing.to_string()));

        let err = client.join(missing, UserId::new()).await.unwrap_err();
        assert_eq!(err, SubredditError::NotFound(missing.to_string()));
    }
}
