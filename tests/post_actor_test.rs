//! Real post actor with mocked user and subreddit actors.
//!
//! Pattern 2: Actor + Mocks
//! - Real post actor (tests cache, store and vote logic)
//! - Mocked User and Subreddit clients (isolates the lookups and the karma message)

mod common;

use chrono::{SubsecRound, Utc};
use common::{insert_post, stored_post, FaultyStore};
use karma_engine::clients::{PostClient, SubredditClient, UserClient};
use karma_engine::framework::mock::{create_mock_client, expect_get, MockClient};
use karma_engine::framework::FrameworkError;
use karma_engine::model::{PostCreate, Subreddit, SubredditId, User, UserId};
use karma_engine::post_actor::{self, ErrorCode, PostDependencies, PostError};
use karma_engine::store::{Collection, DocumentStore, MemoryStore, Query};
use karma_engine::user_actor::UserAction;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const TIMEOUT: Duration = Duration::from_millis(200);

fn user(id: UserId, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        karma: 0,
        created_at: Utc::now().trunc_subsecs(3),
    }
}

fn subreddit(id: SubredditId, name: &str, creator: UserId) -> Subreddit {
    Subreddit {
        id,
        name: name.to_string(),
        description: String::new(),
        creator_id: creator,
        members: vec![creator],
        created_at: Utc::now().trunc_subsecs(3),
    }
}

fn spawn_post_actor(
    store: Arc<dyn DocumentStore>,
    users: UserClient,
    subreddits: SubredditClient,
) -> (PostClient, JoinHandle<()>) {
    let (actor, client) = post_actor::new(8, TIMEOUT, store);
    let handle = tokio::spawn(actor.run(PostDependencies { users, subreddits }));
    (client, handle)
}

#[tokio::test]
async fn test_create_post_looks_up_author_and_subreddit() {
    let author = UserId::new();
    let sub = SubredditId::new();

    let mut user_mock = MockClient::<User>::new();
    let mut subreddit_mock = MockClient::<Subreddit>::new();
    user_mock.expect_get(author).return_ok(Some(user(author, "alice")));
    subreddit_mock
        .expect_get(sub)
        .return_ok(Some(subreddit(sub, "rust", author)));

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let (client, handle) = spawn_post_actor(
        store.clone(),
        UserClient::new(user_mock.client()),
        SubredditClient::new(subreddit_mock.client()),
    );

    let post = client
        .create_post(PostCreate {
            title: "Hello".into(),
            content: "World".into(),
            author_id: author,
            subreddit_id: sub,
        })
        .await
        .unwrap();
    assert_eq!(post.author_username, "alice");
    assert_eq!(post.subreddit_name, "rust");
    assert!(store
        .find_by_id(Collection::Posts, &post.id.to_string())
        .await
        .unwrap()
        .is_some());

    user_mock.verify();
    subreddit_mock.verify();

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_missing_author_stops_before_subreddit_lookup() {
    let author = UserId::new();

    let mut user_mock = MockClient::<User>::new();
    let subreddit_mock = MockClient::<Subreddit>::new();
    user_mock.expect_get(author).return_ok(None);

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let (client, handle) = spawn_post_actor(
        store.clone(),
        UserClient::new(user_mock.client()),
        SubredditClient::new(subreddit_mock.client()),
    );

    let err = client
        .create_post(PostCreate {
            title: "t".into(),
            content: "c".into(),
            author_id: author,
            subreddit_id: SubredditId::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::DependencyNotFound(_)));
    assert!(store.find(Collection::Posts, Query::all()).await.unwrap().is_empty());

    user_mock.verify();
    subreddit_mock.verify();

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_failing_lookup_is_dependency_unavailable() {
    let author = UserId::new();
    let mut user_mock = MockClient::<User>::new();
    user_mock.expect_get(author).return_err(FrameworkError::ActorClosed);

    let (client, handle) = spawn_post_actor(
        Arc::new(MemoryStore::new()),
        UserClient::new(user_mock.client()),
        SubredditClient::new(MockClient::<Subreddit>::new().client()),
    );

    let err = client
        .create_post(PostCreate {
            title: "t".into(),
            content: "c".into(),
            author_id: author,
            subreddit_id: SubredditId::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DependencyUnavailable);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_slow_lookup_times_out_inside_the_actor() {
    let author = UserId::new();
    let (users, mut user_requests) = create_mock_client::<User>(4);

    let (client, handle) = spawn_post_actor(
        Arc::new(MemoryStore::new()),
        UserClient::new(users),
        SubredditClient::new(MockClient::<Subreddit>::new().client()),
    );
    // Outlast the actor's own lookup timeout so its error is what comes back
    let patient = client.with_timeout(TIMEOUT * 5);

    let pending = tokio::spawn(async move {
        patient
            .create_post(PostCreate {
                title: "t".into(),
                content: "c".into(),
                author_id: author,
                subreddit_id: SubredditId::new(),
            })
            .await
    });

    // Take the request and never answer it
    let (id, _responder) = expect_get(&mut user_requests).await.expect("Expected Get request");
    assert_eq!(id, author);

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, PostError::DependencyUnavailable(_)), "{err:?}");

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_vote_tells_author_karma() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let post = stored_post(SubredditId::new(), "voted", 0);
    insert_post(store.as_ref(), &post).await;

    let mut user_mock = MockClient::<User>::new();
    user_mock.expect_tell(post.author_id);
    user_mock.expect_tell(post.author_id);

    let (client, handle) = spawn_post_actor(
        store,
        UserClient::new(user_mock.client()),
        SubredditClient::new(MockClient::<Subreddit>::new().client()),
    );

    let voter = UserId::new();
    client.vote(post.id, voter, true).await.unwrap();
    let flipped = client.vote(post.id, voter, false).await.unwrap();
    assert_eq!((flipped.upvotes, flipped.downvotes, flipped.karma), (0, 1, -1));

    user_mock.verify_within(Duration::from_secs(1)).await;
    assert_eq!(
        user_mock.tells(),
        vec![
            (post.author_id, UserAction::AdjustKarma(1)),
            (post.author_id, UserAction::AdjustKarma(-1)),
        ]
    );

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_vote_succeeds_when_karma_cannot_be_delivered() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let post = stored_post(SubredditId::new(), "lonely", 0);
    insert_post(store.as_ref(), &post).await;

    // Nobody is listening on the user mailbox
    let (users, user_requests) = create_mock_client::<User>(1);
    drop(user_requests);

    let (client, handle) = spawn_post_actor(
        store.clone(),
        UserClient::new(users),
        SubredditClient::new(MockClient::<Subreddit>::new().client()),
    );

    let voted = client.vote(post.id, UserId::new(), true).await.unwrap();
    assert_eq!(voted.karma, 1);
    let doc = store
        .find_by_id(Collection::Posts, &post.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc["upvotes"], 1);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_load_starts_empty_and_reads_through() {
    let store = FaultyStore::new();
    let post = stored_post(SubredditId::new(), "survivor", 0);
    insert_post(store.as_ref(), &post).await;

    store.fail_reads(true);
    let (client, handle) = spawn_post_actor(
        store.clone(),
        UserClient::new(MockClient::<User>::new().client()),
        SubredditClient::new(MockClient::<Subreddit>::new().client()),
    );
    // Initialization is queued ahead of this request
    assert_eq!(client.counts().await.unwrap(), 0);

    store.fail_reads(false);
    assert_eq!(client.get_post(post.id).await.unwrap(), post);
    assert_eq!(client.counts().await.unwrap(), 1);

    drop(client);
    handle.await.unwrap();
}
