//! The post actor: sole owner of the post cache, the vote ledgers and the subreddit index.
//!
//! Every mutation follows the same order: write to the store, and only if that succeeds
//! change the cache. A failed store call leaves the cache exactly as it was.

use super::messages::PostRequest;
use super::votes::{VoteDirection, VoteLedger};
use super::PostError;
use crate::clients::{SubredditClient, UserClient};
use crate::model::{Post, PostCreate, PostId, Subreddit, SubredditId, User, UserId};
use crate::store::{fields, Collection, Document, DocumentStore, Filter, Query, SortOrder, ID_FIELD};
use crate::subreddit_actor::SubredditError;
use crate::user_actor::UserError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Clients of the actors the post actor consults. Injected when the actor starts.
#[derive(Clone)]
pub struct PostDependencies {
    pub users: UserClient,
    pub subreddits: SubredditClient,
}

pub struct PostActor {
    receiver: mpsc::Receiver<PostRequest>,
    store: Arc<dyn DocumentStore>,
    lookup_timeout: Duration,
    posts: HashMap<PostId, Post>,
    ledgers: HashMap<PostId, VoteLedger>,
    by_subreddit: HashMap<SubredditId, Vec<PostId>>,
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

impl PostActor {
    pub(crate) fn new(
        receiver: mpsc::Receiver<PostRequest>,
        store: Arc<dyn DocumentStore>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            store,
            lookup_timeout,
            posts: HashMap::new(),
            ledgers: HashMap::new(),
            by_subreddit: HashMap::new(),
        }
    }

    /// Runs the actor's event loop until every client is dropped.
    pub async fn run(mut self, deps: PostDependencies) {
        info!("Post actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                PostRequest::Initialize => self.load_all().await,
                PostRequest::CreatePost { params, respond_to } => {
                    let _ = respond_to.send(self.create_post(params, &deps).await);
                }
                PostRequest::GetPost { post_id, respond_to } => {
                    let _ = respond_to.send(self.get_post(post_id).await);
                }
                PostRequest::GetSubredditPosts {
                    subreddit_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.subreddit_posts(subreddit_id).await);
                }
                PostRequest::VotePost {
                    post_id,
                    voter_id,
                    is_upvote,
                    respond_to,
                } => {
                    let result = self.vote(post_id, voter_id, is_upvote, &deps).await;
                    let _ = respond_to.send(result);
                }
                PostRequest::GetUserFeed {
                    user_id,
                    limit,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.user_feed(user_id, limit).await);
                }
                PostRequest::GetRecentPosts { limit, respond_to } => {
                    let _ = respond_to.send(self.recent_posts(limit).await);
                }
                PostRequest::GetCounts { respond_to } => {
                    let _ = respond_to.send(Ok(self.posts.len()));
                }
            }
        }

        info!(size = self.posts.len(), "Shutdown");
    }

    // -------------------------------------------------------------------------
    // Cache
    // -------------------------------------------------------------------------

    /// Puts `post` in the cache, keeping any ledger it already has, and indexes it.
    fn cache(&mut self, post: Post) {
        let index = self.by_subreddit.entry(post.subreddit_id).or_default();
        if !index.contains(&post.id) {
            index.push(post.id);
        }
        self.ledgers.entry(post.id).or_default();
        self.posts.insert(post.id, post);
    }

    fn decode_all(docs: Vec<Document>) -> Vec<Post> {
        docs.into_iter()
            .filter_map(|doc| {
                let id = doc.get(ID_FIELD).cloned();
                match Post::from_document(doc) {
                    Ok(post) => Some(post),
                    Err(e) => {
                        warn!(?id, error = %e, "Skipping undecodable post document");
                        None
                    }
                }
            })
            .collect()
    }

    async fn load_all(&mut self) {
        let started = Instant::now();
        let query = Query::all().sort_by(fields::CREATED_AT, SortOrder::Ascending);
        let docs = match self.store.find(Collection::Posts, query).await {
            Ok(docs) => docs,
            Err(e) => {
                error!(error = %e, "Failed to load posts, starting with an empty cache");
                return;
            }
        };

        let total = docs.len();
        for post in Self::decode_all(docs) {
            self.cache(post);
        }
        info!(
            loaded = self.posts.len(),
            skipped = total - self.posts.len(),
            elapsed_ms = elapsed_ms(started),
            "Posts loaded"
        );
    }

    /// Reads one post from the store. Absent means [`PostError::NotFound`].
    async fn fetch(&self, post_id: PostId) -> Result<Post, PostError> {
        let doc = self
            .store
            .find_by_id(Collection::Posts, &post_id.to_string())
            .await?
            .ok_or(PostError::NotFound(post_id))?;
        Ok(Post::from_document(doc)?)
    }

    // -------------------------------------------------------------------------
    // Collaborator lookups
    // -------------------------------------------------------------------------

    async fn lookup_author(&self, users: &UserClient, id: UserId) -> Result<User, PostError> {
        match tokio::time::timeout(self.lookup_timeout, users.lookup_user(id)).await {
            Ok(Ok(user)) => Ok(user),
            Ok(Err(UserError::NotFound(_))) => Err(PostError::DependencyNotFound(format!("user {id}"))),
            Ok(Err(e)) => Err(PostError::DependencyUnavailable(format!("user lookup: {e}"))),
            Err(_) => Err(PostError::DependencyUnavailable(format!(
                "user lookup timed out after {:?}",
                self.lookup_timeout
            ))),
        }
    }

    async fn lookup_subreddit(
        &self,
        subreddits: &SubredditClient,
        id: SubredditId,
    ) -> Result<Subreddit, PostError> {
        match tokio::time::timeout(self.lookup_timeout, subreddits.lookup_subreddit(id)).await {
            Ok(Ok(subreddit)) => Ok(subreddit),
            Ok(Err(SubredditError::NotFound(_))) => {
                Err(PostError::DependencyNotFound(format!("subreddit {id}")))
            }
            Ok(Err(e)) => Err(PostError::DependencyUnavailable(format!("subreddit lookup: {e}"))),
            Err(_) => Err(PostError::DependencyUnavailable(format!(
                "subreddit lookup timed out after {:?}",
                self.lookup_timeout
            ))),
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    async fn create_post(&mut self, params: PostCreate, deps: &PostDependencies) -> Result<Post, PostError> {
        let started = Instant::now();
        debug!(?params, "CreatePost");

        let author = self.lookup_author(&deps.users, params.author_id).await;
        let author = author.inspect_err(|e| warn!(error = %e, "CreatePost rejected"))?;
        let subreddit = self.lookup_subreddit(&deps.subreddits, params.subreddit_id).await;
        let subreddit = subreddit.inspect_err(|e| warn!(error = %e, "CreatePost rejected"))?;

        let post = Post::new(params, author.username, subreddit.name);
        if let Err(e) = self.store.insert(Collection::Posts, post.to_document()?).await {
            warn!(post_id = %post.id, error = %e, "Post insert failed");
            return Err(e.into());
        }

        self.cache(post.clone());
        info!(
            post_id = %post.id,
            subreddit_id = %post.subreddit_id,
            size = self.posts.len(),
            elapsed_ms = elapsed_ms(started),
            "Post created"
        );
        Ok(post)
    }

    async fn get_post(&mut self, post_id: PostId) -> Result<Post, PostError> {
        if let Some(post) = self.posts.get(&post_id) {
            debug!(%post_id, "GetPost cache hit");
            return Ok(post.clone());
        }

        let post = self.fetch(post_id).await?;
        debug!(%post_id, "GetPost backfilled from store");
        self.cache(post.clone());
        Ok(post)
    }

    async fn subreddit_posts(&mut self, subreddit_id: SubredditId) -> Result<Vec<Post>, PostError> {
        let query = Query::filter(Filter::eq(fields::SUBREDDIT_ID, subreddit_id.to_string()))
            .newest_first(fields::CREATED_AT);
        let posts = Self::decode_all(self.store.find(Collection::Posts, query).await?);

        for post in &posts {
            self.cache(post.clone());
        }
        debug!(%subreddit_id, count = posts.len(), "GetSubredditPosts");
        Ok(posts)
    }

    async fn vote(
        &mut self,
        post_id: PostId,
        voter_id: UserId,
        is_upvote: bool,
        deps: &PostDependencies,
    ) -> Result<Post, PostError> {
        let started = Instant::now();

        if !self.posts.contains_key(&post_id) {
            let post = self
                .fetch(post_id)
                .await
                .inspect_err(|e| warn!(%post_id, error = %e, "Vote rejected"))?;
            self.cache(post);
        }

        let direction = VoteDirection::from_upvote(is_upvote);
        let planned = self.ledgers.entry(post_id).or_default().plan(&voter_id, direction);
        let Some(deltas) = planned else {
            warn!(%post_id, %voter_id, ?direction, "Duplicate vote");
            return Err(PostError::Duplicate { post_id });
        };

        self.store
            .increment(
                Collection::Posts,
                &post_id.to_string(),
                &[
                    (fields::UPVOTES, deltas.upvotes),
                    (fields::DOWNVOTES, deltas.downvotes),
                    (fields::KARMA, deltas.karma()),
                ],
            )
            .await
            .inspect_err(|e| warn!(%post_id, error = %e, "Vote store update failed"))?;

        let Some(post) = self.posts.get_mut(&post_id) else {
            return Err(PostError::NotFound(post_id));
        };
        post.apply_deltas(deltas.upvotes, deltas.downvotes);
        let updated = post.clone();
        self.ledgers
            .entry(post_id)
            .or_default()
            .record(voter_id, direction);

        if let Err(e) = deps
            .users
            .update_karma(updated.author_id, direction.karma_delta())
        {
            warn!(author_id = %updated.author_id, error = %e, "Karma update dropped");
        }

        info!(
            %post_id,
            %voter_id,
            ?direction,
            upvotes = updated.upvotes,
            downvotes = updated.downvotes,
            karma = updated.karma,
            elapsed_ms = elapsed_ms(started),
            "Vote recorded"
        );
        Ok(updated)
    }

    async fn user_feed(&self, user_id: UserId, limit: usize) -> Result<Vec<Post>, PostError> {
        let started = Instant::now();
        let memberships = self
            .store
            .find(
                Collection::Subreddits,
                Query::filter(Filter::contains(fields::MEMBERS, user_id.to_string())),
            )
            .await?;
        let subreddit_ids: Vec<_> = memberships
            .iter()
            .filter_map(|doc| doc.get(ID_FIELD).cloned())
            .collect();
        if subreddit_ids.is_empty() {
            debug!(%user_id, "Feed empty, no memberships");
            return Ok(Vec::new());
        }

        let query = Query::filter(Filter::In(fields::SUBREDDIT_ID.to_string(), subreddit_ids))
            .newest_first(fields::CREATED_AT)
            .limit(limit);
        let posts = Self::decode_all(self.store.find(Collection::Posts, query).await?);
        debug!(%user_id, count = posts.len(), elapsed_ms = elapsed_ms(started), "GetUserFeed");
        Ok(posts)
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, PostError> {
        let query = Query::all().newest_first(fields::CREATED_AT).limit(limit);
        Ok(Self::decode_all(self.store.find(Collection::Posts, query).await?))
    }
}
