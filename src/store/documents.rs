//! Mapping between domain models and stored documents.
//!
//! Field names are camelCase, ids are UUID strings under `_id`, and timestamps are epoch
//! milliseconds.

use super::{Document, StoreError};
use crate::model::{Comment, CommentId, Post, PostId, Subreddit, SubredditId, User, UserId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document field names used in queries and increments.
pub mod fields {
    pub const SUBREDDIT_ID: &str = "subredditId";
    pub const POST_ID: &str = "postId";
    pub const PARENT_ID: &str = "parentId";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPVOTES: &str = "upvotes";
    pub const DOWNVOTES: &str = "downvotes";
    pub const KARMA: &str = "karma";
    pub const MEMBERS: &str = "members";
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Decode(format!("expected an object, got {other}"))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Decode(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub subreddit_id: SubredditId,
    pub subreddit_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub karma: i64,
}

impl From<&Post> for PostDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            author_id: post.author_id,
            author_username: post.author_username.clone(),
            subreddit_id: post.subreddit_id,
            subreddit_name: post.subreddit_name.clone(),
            created_at: post.created_at,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            karma: post.karma,
        }
    }
}

impl From<PostDocument> for Post {
    /// The stored karma is ignored; it is always derived from the counters.
    fn from(doc: PostDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            author_id: doc.author_id,
            author_username: doc.author_username,
            subreddit_id: doc.subreddit_id,
            subreddit_name: doc.subreddit_name,
            created_at: doc.created_at,
            upvotes: doc.upvotes,
            downvotes: doc.downvotes,
            karma: doc.upvotes - doc.downvotes,
        }
    }
}

impl Post {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        to_document(&PostDocument::from(self))
    }

    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        from_document::<PostDocument>(doc).map(Post::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub karma: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        to_document(&UserDocument {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            karma: self.karma,
            created_at: self.created_at,
        })
    }

    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        let d: UserDocument = from_document(doc)?;
        Ok(Self {
            id: d.id,
            username: d.username,
            email: d.email,
            karma: d.karma,
            created_at: d.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubredditDocument {
    #[serde(rename = "_id")]
    pub id: SubredditId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub creator_id: UserId,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Subreddit {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        to_document(&SubredditDocument {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            creator_id: self.creator_id,
            members: self.members.clone(),
            created_at: self.created_at,
        })
    }

    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        let d: SubredditDocument = from_document(doc)?;
        Ok(Self {
            id: d.id,
            name: d.name,
            description: d.description,
            creator_id: d.creator_id,
            members: d.members,
            created_at: d.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDocument {
    #[serde(rename = "_id")]
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub karma: i64,
}

impl Comment {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        to_document(&CommentDocument {
            id: self.id,
            content: self.content.clone(),
            author_id: self.author_id,
            post_id: self.post_id,
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            karma: self.karma,
        })
    }

    /// Karma is derived from the counters, as for posts.
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        let d: CommentDocument = from_document(doc)?;
        Ok(Self {
            id: d.id,
            content: d.content,
            author_id: d.author_id,
            post_id: d.post_id,
            parent_id: d.parent_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
            upvotes: d.upvotes,
            downvotes: d.downvotes,
            karma: d.upvotes - d.downvotes,
        })
    }
}
