use crate::clients::{ActorClient, CommentClient, PostClient, SubredditClient, UserClient};
use crate::comment_actor::CommentContext;
use crate::lifecycle::EngineConfig;
use crate::post_actor::PostDependencies;
use crate::store::{DocumentStore, MemoryStore, StoreError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors raised while starting, probing or stopping the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Actor unavailable: {0}")]
    Unavailable(String),

    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// The actors the engine routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRole {
    /// Posts and votes.
    Content,
    /// User accounts and karma.
    Identity,
    /// Subreddits and memberships.
    Community,
    /// Comments and replies.
    Discussion,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorRole::Content => "content",
            ActorRole::Identity => "identity",
            ActorRole::Community => "community",
            ActorRole::Discussion => "discussion",
        };
        f.write_str(name)
    }
}

/// A client resolved by role.
#[derive(Clone)]
pub enum ActorHandle {
    Content(PostClient),
    Identity(UserClient),
    Community(SubredditClient),
    Discussion(CommentClient),
}

impl ActorHandle {
    pub fn role(&self) -> ActorRole {
        match self {
            ActorHandle::Content(_) => ActorRole::Content,
            ActorHandle::Identity(_) => ActorRole::Identity,
            ActorHandle::Community(_) => ActorRole::Community,
            ActorHandle::Discussion(_) => ActorRole::Discussion,
        }
    }
}

/// Liveness snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    /// Posts resident in the content actor's cache.
    pub post_count: usize,
    pub subreddit_count: usize,
    pub comment_count: usize,
}

/// Owns the running actors and hands out their clients.
///
/// The engine only wires actors together: it holds no business logic and never retries.
///
/// # Example
///
/// ```ignore
/// let config = EngineConfig::from_env()?;
/// let store = Engine::open_store(&config).await?;
/// let engine = Engine::start(config, store).await?;
///
/// let post = engine.posts().create_post(params).await?;
///
/// engine.shutdown().await?;
/// ```
pub struct Engine {
    config: EngineConfig,
    posts: PostClient,
    users: UserClient,
    subreddits: SubredditClient,
    comments: CommentClient,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Engine {
    /// Opens the store named by the configuration, or an in-memory one if none is set.
    pub async fn open_store(config: &EngineConfig) -> Result<Arc<dyn DocumentStore>, EngineError> {
        let store: Arc<dyn DocumentStore> = match &config.store_path {
            Some(path) => Arc::new(MemoryStore::open(path).await?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }

    /// Starts every actor, each in its own task.
    ///
    /// Users, subreddits and comments are read from the store up front; a failure there,
    /// or an invalid configuration, aborts startup. The post actor loads its own cache.
    pub async fn start(config: EngineConfig, store: Arc<dyn DocumentStore>) -> Result<Self, EngineError> {
        config.validate()?;

        // 1. Read the seed data before anything is spawned
        let users = crate::user_actor::load(store.as_ref()).await?;
        let subreddits = crate::subreddit_actor::load(store.as_ref()).await?;
        let comments = crate::comment_actor::load(store.as_ref()).await?;
        info!(
            users = users.len(),
            subreddits = subreddits.len(),
            comments = comments.len(),
            "Seed data loaded"
        );

        // 2. Create actors
        let (user_actor, user_client) = crate::user_actor::new(config.mailbox_capacity);
        let (subreddit_actor, subreddit_client) =
            crate::subreddit_actor::new(config.mailbox_capacity);
        let (post_actor, post_client) =
            crate::post_actor::new(config.mailbox_capacity, config.request_timeout, store.clone());
        let (comment_actor, comment_client) = crate::comment_actor::new(config.mailbox_capacity);

        // 3. Start actors with injected context
        let user_handle = tokio::spawn(user_actor.with_entities(users).run(store.clone()));
        let subreddit_handle =
            tokio::spawn(subreddit_actor.with_entities(subreddits).run(store.clone()));
        let post_handle = tokio::spawn(post_actor.run(PostDependencies {
            users: user_client.clone(),
            subreddits: subreddit_client.clone(),
        }));
        let comment_handle = tokio::spawn(comment_actor.with_entities(comments).run(CommentContext {
            store: store.clone(),
            users: user_client.clone(),
            posts: post_client.clone(),
            lookup_timeout: config.request_timeout,
        }));

        info!(
            mailbox_capacity = config.mailbox_capacity,
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            "Engine started"
        );

        Ok(Self {
            config,
            posts: post_client,
            users: user_client,
            subreddits: subreddit_client,
            comments: comment_client,
            handles: vec![user_handle, subreddit_handle, post_handle, comment_handle],
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn posts(&self) -> &PostClient {
        &self.posts
    }

    pub fn users(&self) -> &UserClient {
        &self.users
    }

    pub fn subreddits(&self) -> &SubredditClient {
        &self.subreddits
    }

    pub fn comments(&self) -> &CommentClient {
        &self.comments
    }

    /// Resolves the client for a role.
    pub fn handle(&self, role: ActorRole) -> ActorHandle {
        match role {
            ActorRole::Content => ActorHandle::Content(self.posts.clone()),
            ActorRole::Identity => ActorHandle::Identity(self.users.clone()),
            ActorRole::Community => ActorHandle::Community(self.subreddits.clone()),
            ActorRole::Discussion => ActorHandle::Discussion(self.comments.clone()),
        }
    }

    pub async fn health(&self) -> Result<HealthReport, EngineError> {
        let post_count = self
            .posts
            .counts()
            .await
            .map_err(|e| EngineError::Unavailable(format!("{}: {e}", ActorRole::Content)))?;
        let subreddit_count = self
            .subreddits
            .count()
            .await
            .map_err(|e| EngineError::Unavailable(format!("{}: {e}", ActorRole::Community)))?;
        let comment_count = self
            .comments
            .count()
            .await
            .map_err(|e| EngineError::Unavailable(format!("{}: {e}", ActorRole::Discussion)))?;
        Ok(HealthReport {
            post_count,
            subreddit_count,
            comment_count,
        })
    }

    /// Gracefully shuts down every actor.
    ///
    /// Dropping the engine's clients closes the mailboxes once no other clones are alive;
    /// each actor then drains what is queued and exits. Clients handed out through
    /// [`Engine::handle`] must be dropped before this returns.
    pub async fn shutdown(self) -> Result<(), EngineError> {
        info!("Shutting down engine...");

        // Collaborators stay up until every actor holding their clones has exited
        drop(self.comments);
        drop(self.posts);
        drop(self.users);
        drop(self.subreddits);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(EngineError::TaskFailed(e.to_string()));
            }
        }

        info!("Engine shutdown complete.");
        Ok(())
    }
}
