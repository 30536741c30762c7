//! # Karma Engine
//!
//! The concurrent state core of a link-sharing community: posts, votes, author karma and
//! feeds, each slice of state owned by one actor.
//!
//! ## Architecture
//!
//! Every actor is a Tokio task with a bounded mailbox that handles one message at a time,
//! so the maps it owns need no locks. Replies travel back on `oneshot` channels.
//!
//! - **Content** ([`post_actor`]): posts, per-post vote ledgers and the subreddit index.
//!   Writes go to the store first and reach the cache only once the store accepted them.
//!   An accepted vote sends a fire-and-forget karma adjustment to the identity actor.
//! - **Identity** ([`user_actor`]), **Community** ([`subreddit_actor`]) and
//!   **Discussion** ([`comment_actor`]): built on the generic
//!   [`ResourceActor`](framework::ResourceActor) from [`framework`]. Comment votes follow
//!   the same rules as post votes and also adjust the author's karma.
//! - **Store** ([`store`]): the document store all actors write through to.
//! - **Engine** ([`lifecycle`]): starts the actors, wires them together and resolves
//!   clients by role.
//!
//! Callers never touch mailboxes directly; they go through the typed clients in
//! [`clients`]. Post requests carry a timeout, and a timed-out request is abandoned by
//! the caller but still completed by the actor.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! KARMA_STORE_PATH=/tmp/karma.json cargo run   # keep data between runs
//! ```

pub mod clients;
pub mod comment_actor;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod post_actor;
pub mod store;
pub mod subreddit_actor;
pub mod user_actor;
