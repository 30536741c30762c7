//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient) and the
//! content actor's mailbox.

pub mod actor_client;
pub mod comment_client;
pub mod post_client;
pub mod subreddit_client;
pub mod user_client;

pub use actor_client::*;
pub use comment_client::*;
pub use post_client::*;
pub use subreddit_client::*;
pub use user_client::*;
