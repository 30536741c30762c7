//! Durable document store.
//!
//! The store is the source of truth for every entity; actor caches are rebuilt from it at
//! start. Documents are JSON objects keyed by their `_id` field.

pub mod documents;
pub mod memory;

pub use documents::*;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// A stored document.
pub type Document = Map<String, Value>;

/// The field every document is keyed by.
pub const ID_FIELD: &str = "_id";

/// The independent collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Comments,
    Users,
    Subreddits,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Posts,
        Collection::Comments,
        Collection::Users,
        Collection::Subreddits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Comments => "comments",
            Collection::Users => "users",
            Collection::Subreddits => "subreddits",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the document store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored document does not have the expected shape.
    #[error("Document decode error: {0}")]
    Decode(String),

    /// An update matched no document.
    #[error("No document {id} in {collection}")]
    NoMatch { collection: Collection, id: String },

    /// The update cannot be applied to the stored document.
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// Insert of an id that already exists.
    #[error("Duplicate key {id} in {collection}")]
    Duplicate { collection: Collection, id: String },

    /// Snapshot file could not be read or written.
    #[error("Store I/O error: {0}")]
    Io(String),
}

/// Document predicate. Field names refer to top-level document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the value.
    Eq(String, Value),
    /// Field equals one of the values.
    In(String, Vec<Value>),
    /// Field is an array containing the value.
    Contains(String, Value),
    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => doc.get(field) == Some(value),
            Filter::In(field, values) => doc.get(field).is_some_and(|v| values.contains(v)),
            Filter::Contains(field, value) => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// A filtered, optionally sorted and limited query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::filter(Filter::All)
    }

    pub fn filter(filter: Filter) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
        }
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            order,
        });
        self
    }

    pub fn newest_first(self, field: impl Into<String>) -> Self {
        self.sort_by(field, SortOrder::Descending)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Orders JSON values: missing/null < bool < number < string < anything else.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// The durable store as the actors see it.
///
/// Every method is atomic with respect to the others. Implementations synchronize
/// internally so the store can be shared between actors behind an `Arc`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: Collection, query: Query) -> Result<Vec<Document>, StoreError>;

    /// Inserts a new document. Fails with [`StoreError::Duplicate`] if the `_id` exists.
    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError>;

    /// Inserts or fully replaces the document with the same `_id`.
    async fn upsert(&self, collection: Collection, doc: Document) -> Result<(), StoreError>;

    /// Adds each delta to its integer field in one atomic step and returns the updated document.
    ///
    /// Fails with [`StoreError::NoMatch`] if no document has this id.
    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        deltas: &[(&str, i64)],
    ) -> Result<Document, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn filters_match_documents() {
        let d = doc(json!({"_id": "1", "sub": "a", "members": ["u1", "u2"], "n": 3}));

        assert!(Filter::All.matches(&d));
        assert!(Filter::eq("sub", "a").matches(&d));
        assert!(!Filter::eq("sub", "b").matches(&d));
        assert!(Filter::is_in("sub", ["x", "a"]).matches(&d));
        assert!(!Filter::is_in("missing", ["a"]).matches(&d));
        assert!(Filter::contains("members", "u2").matches(&d));
        assert!(!Filter::contains("sub", "a").matches(&d));
        assert!(Filter::And(vec![Filter::eq("n", 3), Filter::contains("members", "u1")]).matches(&d));
        assert!(!Filter::And(vec![Filter::eq("n", 3), Filter::contains("members", "u9")]).matches(&d));
    }

    #[test]
    fn values_order_by_kind_then_value() {
        let one = json!(1);
        let two = json!(2.5);
        let s = json!("a");
        assert_eq!(compare_values(Some(&one), Some(&two)), Ordering::Less);
        assert_eq!(compare_values(None, Some(&one)), Ordering::Less);
        assert_eq!(compare_values(Some(&s), Some(&one)), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(5)), Some(&json!(5))), Ordering::Equal);
    }
}
