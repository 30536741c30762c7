//! Demo binary: starts the engine, runs a short voting and comment session and shuts down.

use anyhow::{Context, Result};
use karma_engine::clients::ActorClient;
use karma_engine::lifecycle::{setup_tracing, Engine, EngineConfig};
use karma_engine::model::{CommentCreate, PostCreate, SubredditCreate, UserCreate};
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::from_env().context("Failed to load configuration")?;
    setup_tracing(&config.log_level);

    info!(?config, "Starting karma engine");

    let store = Engine::open_store(&config)
        .await
        .context("Failed to open document store")?;
    let engine = Engine::start(config, store)
        .await
        .context("Failed to start engine")?;

    let span = tracing::info_span!("registration");
    let (author, voter, subreddit) = async {
        let author = engine
            .users()
            .register_user(UserCreate {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await?;
        let voter = engine
            .users()
            .register_user(UserCreate {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
            })
            .await?;
        let subreddit = engine
            .subreddits()
            .create_subreddit(SubredditCreate {
                name: "rust".to_string(),
                description: "All things Rust".to_string(),
                creator_id: author,
            })
            .await?;
        engine.subreddits().join(subreddit, voter).await?;
        anyhow::Ok((author, voter, subreddit))
    }
    .instrument(span)
    .await?;

    let post = engine
        .posts()
        .create_post(PostCreate {
            title: "Fearless concurrency".to_string(),
            content: "Actors own their state.".to_string(),
            author_id: author,
            subreddit_id: subreddit,
        })
        .await?;
    info!(post_id = %post.id, "Post created");

    let span = tracing::info_span!("voting");
    async {
        engine.posts().vote(post.id, voter, true).await?;
        if let Err(e) = engine.posts().vote(post.id, voter, true).await {
            warn!(error = %e, code = ?e.code(), "Second upvote rejected");
        }
        let post = engine.posts().vote(post.id, voter, false).await?;
        info!(upvotes = post.upvotes, downvotes = post.downvotes, karma = post.karma, "Votes applied");
        anyhow::Ok(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("discussion");
    async {
        let comment = engine
            .comments()
            .create_comment(CommentCreate {
                content: "Until two actors wait on each other.".to_string(),
                author_id: voter,
                post_id: post.id,
                parent_id: None,
            })
            .await?;
        engine
            .comments()
            .create_comment(CommentCreate {
                content: "Keep the dependency graph acyclic.".to_string(),
                author_id: author,
                post_id: post.id,
                parent_id: Some(comment),
            })
            .await?;
        engine.comments().vote(comment, author, true).await?;
        let thread = engine.comments().post_comments(post.id).await?;
        info!(comments = thread.len(), "Thread loaded");
        anyhow::Ok(())
    }
    .instrument(span)
    .await?;

    let feed = engine
        .posts()
        .user_feed(voter, engine.config().feed_limit)
        .await?;
    info!(feed_len = feed.len(), "Feed for voter");

    // Karma updates are fire-and-forget; give the identity actor a moment
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    if let Some(author) = engine.users().get(author).await? {
        info!(username = %author.username, karma = author.karma, "Author karma");
    }

    let health = engine.health().await?;
    info!(
        posts = health.post_count,
        subreddits = health.subreddit_count,
        comments = health.comment_count,
        "Health"
    );

    engine.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
