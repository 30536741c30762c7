//! Discussion actor: comments, replies and comment votes.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;

use crate::clients::CommentClient;
use crate::framework::ResourceActor;
use crate::model::{Comment, CommentId};
use crate::store::{Collection, DocumentStore, Query, StoreError};
use tracing::warn;

/// Creates a new Comment actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<CommentEntry>, CommentClient) {
    let (actor, generic_client) = ResourceActor::new(capacity, CommentId::new);
    (actor, CommentClient::new(generic_client))
}

/// Reads every comment document for seeding the actor. Undecodable documents are skipped.
///
/// Vote ledgers are not stored, so seeded comments start with empty ones.
pub async fn load(store: &dyn DocumentStore) -> Result<Vec<CommentEntry>, StoreError> {
    let docs = store.find(Collection::Comments, Query::all()).await?;
    Ok(docs
        .into_iter()
        .filter_map(|doc| match Comment::from_document(doc) {
            Ok(comment) => Some(comment.into()),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable comment document");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{PostClient, UserClient};
    use crate::framework::mock::{create_mock_client, MockClient};
    use crate::framework::ActorEntity;
    use crate::model::{CommentCreate, CommentEdit, PostId, User, UserId};
    use crate::post_actor::VoteDirection;
    use crate::store::{Document, MemoryStore};
    use crate::user_actor::UserAction;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn context(store: Arc<dyn DocumentStore>, users: UserClient) -> CommentContext {
        let (sender, _) = mpsc::channel(1);
        CommentContext {
            store,
            users,
            posts: PostClient::new(sender, Duration::from_millis(100)),
            lookup_timeout: Duration::from_millis(100),
        }
    }

    fn closed_users() -> UserClient {
        let (client, _) = create_mock_client::<User>(1);
        UserClient::new(client)
    }

    fn comment_by(author_id: UserId) -> Comment {
        Comment::new(
            CommentId::new(),
            CommentCreate {
                content: "first!".into(),
                author_id,
                post_id: PostId::new(),
                parent_id: None,
            },
        )
    }

    async fn stored(store: &dyn DocumentStore, id: CommentId) -> Document {
        store
            .find_by_id(Collection::Comments, &id.to_string())
            .await
            .unwrap()
            .unwrap()
    }

    #[test]
    fn blank_content_is_rejected() {
        let err = CommentEntry::from_create_params(
            CommentId::new(),
            CommentCreate {
                content: " \n".into(),
                author_id: UserId::new(),
                post_id: PostId::new(),
                parent_id: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CommentError::ValidationError(_)));
    }

    #[tokio::test]
    async fn only_the_author_can_edit() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let author = UserId::new();
        let comment = comment_by(author);
        store
            .insert(Collection::Comments, comment.to_document().unwrap())
            .await
            .unwrap();
        let ctx = context(store.clone(), closed_users());
        let mut entry = CommentEntry::from(comment.clone());

        let err = entry
            .on_update(
                CommentEdit {
                    editor_id: UserId::new(),
                    content: "hijacked".into(),
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::Forbidden(_)));
        assert_eq!(stored(store.as_ref(), comment.id).await["content"], "first!");

        entry
            .on_update(
                CommentEdit {
                    editor_id: author,
                    content: "second thoughts".into(),
                },
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(entry.comment.content, "second thoughts");
        assert!(entry.comment.updated_at >= entry.comment.created_at);
        let doc = stored(store.as_ref(), comment.id).await;
        assert_eq!(Comment::from_document(doc).unwrap(), entry.comment);
    }

    #[tokio::test]
    async fn votes_follow_the_ledger_and_tell_the_author() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let author = UserId::new();
        let voter = UserId::new();
        let comment = comment_by(author);
        store
            .insert(Collection::Comments, comment.to_document().unwrap())
            .await
            .unwrap();

        let mut users = MockClient::<User>::new();
        users.expect_tell(author);
        users.expect_tell(author);
        let ctx = context(store.clone(), UserClient::new(users.client()));
        let mut entry = CommentEntry::from(comment.clone());
        let vote = |direction| CommentAction::Vote {
            voter_id: voter,
            direction,
        };

        let up = entry.handle_action(vote(VoteDirection::Up), &ctx).await.unwrap();
        assert_eq!((up.upvotes, up.downvotes, up.karma), (1, 0, 1));

        let err = entry
            .handle_action(vote(VoteDirection::Up), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err, CommentError::Duplicate(comment.id));

        let down = entry.handle_action(vote(VoteDirection::Down), &ctx).await.unwrap();
        assert_eq!((down.upvotes, down.downvotes, down.karma), (0, 1, -1));

        let doc = stored(store.as_ref(), comment.id).await;
        assert_eq!(doc["upvotes"], json!(0));
        assert_eq!(doc["downvotes"], json!(1));
        assert_eq!(doc["karma"], json!(-1));

        users.verify_within(Duration::from_secs(1)).await;
        assert_eq!(
            users.tells(),
            vec![
                (author, UserAction::AdjustKarma(1)),
                (author, UserAction::AdjustKarma(-1)),
            ]
        );
    }

    #[tokio::test]
    async fn failed_store_write_records_no_vote() {
        // Never stored, so the increment finds nothing
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let ctx = context(store, closed_users());
        let mut entry = CommentEntry::from(comment_by(UserId::new()));
        let voter = UserId::new();

        let err = entry
            .handle_action(
                CommentAction::Vote {
                    voter_id: voter,
                    direction: VoteDirection::Up,
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::Storage(_)));
        assert_eq!(entry.comment.karma, 0);
        assert!(entry.votes.is_empty());
    }

    #[tokio::test]
    async fn load_skips_undecodable_comments() {
        let store = MemoryStore::new();
        let comment = comment_by(UserId::new());
        store
            .insert(Collection::Comments, comment.to_document().unwrap())
            .await
            .unwrap();
        let broken = match json!({"_id": "c-broken", "content": 3}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.insert(Collection::Comments, broken).await.unwrap();

        let loaded = load(&store).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].comment, comment);
        assert!(loaded[0].votes.is_empty());
    }
}
