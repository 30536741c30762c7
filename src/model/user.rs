use super::UserId;
use chrono::{DateTime, Utc};

/// Represents a registered user in the system.
///
/// Managed by a [`ResourceActor`](crate::framework::ResourceActor); see
/// [`crate::user_actor`] for the entity implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub karma: i64,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
}
