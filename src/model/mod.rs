//! Pure data structures shared by the actors.

pub mod comment;
pub mod ids;
pub mod post;
pub mod subreddit;
pub mod user;

pub use comment::*;
pub use ids::*;
pub use post::*;
pub use subreddit::*;
pub use user::*;
