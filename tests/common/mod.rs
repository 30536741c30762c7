//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SubsecRound, Utc};
use karma_engine::lifecycle::{Engine, EngineConfig};
use karma_engine::model::{Post, PostCreate, SubredditId, UserId};
use karma_engine::store::{Collection, Document, DocumentStore, MemoryStore, Query, StoreError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A [`MemoryStore`] whose reads and writes can be made to fail or stall on demand.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    write_delay_ms: AtomicU64,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn delay_writes(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn before_write(&self) -> Result<(), StoreError> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }

    fn before_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.before_read()?;
        self.inner.find_by_id(collection, id).await
    }

    async fn find(&self, collection: Collection, query: Query) -> Result<Vec<Document>, StoreError> {
        self.before_read()?;
        self.inner.find(collection, query).await
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        self.before_write().await?;
        self.inner.insert(collection, doc).await
    }

    async fn upsert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        self.before_write().await?;
        self.inner.upsert(collection, doc).await
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        deltas: &[(&str, i64)],
    ) -> Result<Document, StoreError> {
        self.before_write().await?;
        self.inner.increment(collection, id, deltas).await
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        mailbox_capacity: 16,
        request_timeout: Duration::from_secs(2),
        ..EngineConfig::default()
    }
}

pub async fn start_engine(store: Arc<dyn DocumentStore>) -> Engine {
    Engine::start(test_config(), store).await.unwrap()
}

/// A post that never went through the actor, created `age_secs` seconds ago.
pub fn stored_post(subreddit_id: SubredditId, title: &str, age_secs: i64) -> Post {
    let mut post = Post::new(
        PostCreate {
            title: title.to_string(),
            content: format!("{title} body"),
            author_id: UserId::new(),
            subreddit_id,
        },
        "someone",
        "somewhere",
    );
    post.created_at = minutes_ago(0) - ChronoDuration::seconds(age_secs);
    post
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    (Utc::now() - ChronoDuration::minutes(minutes)).trunc_subsecs(3)
}

pub async fn insert_post(store: &dyn DocumentStore, post: &Post) {
    store
        .insert(Collection::Posts, post.to_document().unwrap())
        .await
        .unwrap();
}

/// Polls `check` until it returns true or a second has passed.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
