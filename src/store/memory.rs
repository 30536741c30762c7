//! In-process [`DocumentStore`] with an optional JSON snapshot file.

use super::{
    compare_values, Collection, Document, DocumentStore, Query, SortOrder, StoreError, ID_FIELD,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type Collections = BTreeMap<Collection, BTreeMap<String, Document>>;

/// Document store that keeps every collection in memory.
///
/// All operations run under one async mutex, so each is atomic. When opened with a path,
/// the whole store is loaded from that file and rewritten after every mutation (write to a
/// temporary sibling, then rename). A mutation whose snapshot write fails is rolled back.
pub struct MemoryStore {
    data: Mutex<Collections>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store that lives only as long as the process.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(Collections::new()),
            snapshot: None,
        }
    }

    /// Opens a store backed by the snapshot file at `path`, creating it on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Collections>(&bytes).map_err(|e| {
                StoreError::Decode(format!("snapshot {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot yet, starting empty");
                Collections::new()
            }
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", path.display()))),
        };

        let documents: usize = data.values().map(BTreeMap::len).sum();
        info!(path = %path.display(), documents, "Store opened");

        Ok(Self {
            data: Mutex::new(data),
            snapshot: Some(path),
        })
    }

    async fn persist(&self, data: &Collections) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(data).map_err(|e| StoreError::Io(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;
        Ok(())
    }

    /// Stores `doc` under `id`, persists, and restores the previous state if persisting fails.
    async fn write(
        &self,
        data: &mut Collections,
        collection: Collection,
        id: String,
        doc: Document,
    ) -> Result<(), StoreError> {
        let previous = data.entry(collection).or_default().insert(id.clone(), doc);
        if let Err(e) = self.persist(data).await {
            warn!(%collection, %id, error = %e, "Snapshot write failed, rolling back");
            let docs = data.entry(collection).or_default();
            match previous {
                Some(old) => {
                    docs.insert(id, old);
                }
                None => {
                    docs.remove(&id);
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn document_id(doc: &Document) -> Result<String, StoreError> {
    match doc.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id.clone()),
        _ => Err(StoreError::InvalidUpdate(format!(
            "document has no string {ID_FIELD}"
        ))),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let data = self.data.lock().await;
        Ok(data.get(&collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn find(&self, collection: Collection, query: Query) -> Result<Vec<Document>, StoreError> {
        let data = self.data.lock().await;
        let mut found: Vec<Document> = data
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| query.filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(data);

        if let Some(sort) = &query.sort {
            found.sort_by(|a, b| {
                let ord = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        debug!(%collection, results = found.len(), "Find");
        Ok(found)
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let id = document_id(&doc)?;
        let mut data = self.data.lock().await;
        if data.get(&collection).is_some_and(|docs| docs.contains_key(&id)) {
            return Err(StoreError::Duplicate { collection, id });
        }
        self.write(&mut data, collection, id, doc).await
    }

    async fn upsert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let id = document_id(&doc)?;
        let mut data = self.data.lock().await;
        self.write(&mut data, collection, id, doc).await
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        deltas: &[(&str, i64)],
    ) -> Result<Document, StoreError> {
        let mut data = self.data.lock().await;
        let Some(current) = data.get(&collection).and_then(|docs| docs.get(id)) else {
            return Err(StoreError::NoMatch {
                collection,
                id: id.to_string(),
            });
        };

        let mut updated = current.clone();
        for (field, delta) in deltas {
            let value = match updated.get(*field) {
                None | Some(Value::Null) => 0,
                Some(v) => v.as_i64().ok_or_else(|| {
                    StoreError::InvalidUpdate(format!("{field} is not an integer"))
                })?,
            };
            let next = value.checked_add(*delta).ok_or_else(|| {
                StoreError::InvalidUpdate(format!("{field} would overflow"))
            })?;
            updated.insert((*field).to_string(), Value::from(next));
        }

        self.write(&mut data, collection, id.to_string(), updated.clone())
            .await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Filter, Query};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Users, doc(json!({"_id": "u1", "username": "a"})))
            .await
            .unwrap();
        let err = store
            .insert(Collection::Users, doc(json!({"_id": "u1", "username": "b"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let stored = store.find_by_id(Collection::Users, "u1").await.unwrap().unwrap();
        assert_eq!(stored["username"], "a");
    }

    #[tokio::test]
    async fn find_sorts_and_limits() {
        let store = MemoryStore::new();
        for (id, sub, at) in [("p1", "a", 10), ("p2", "b", 30), ("p3", "a", 20), ("p4", "a", 5)] {
            store
                .insert(
                    Collection::Posts,
                    doc(json!({"_id": id, "subredditId": sub, "createdAt": at})),
                )
                .await
                .unwrap();
        }

        let found = store
            .find(
                Collection::Posts,
                Query::filter(Filter::eq("subredditId", "a"))
                    .newest_first("createdAt")
                    .limit(2),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|d| d["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["p3", "p1"]);
    }

    #[tokio::test]
    async fn increment_updates_all_fields_or_none() {
        let store = MemoryStore::new();
        store
            .insert(
                Collection::Comments,
                doc(json!({"_id": "c1", "upvotes": 1, "downvotes": 0, "karma": 1, "body": "hi"})),
            )
            .await
            .unwrap();

        let updated = store
            .increment(Collection::Comments, "c1", &[("upvotes", -1), ("downvotes", 1), ("karma", -2)])
            .await
            .unwrap();
        assert_eq!(updated["karma"], -1);

        let err = store
            .increment(Collection::Comments, "c1", &[("upvotes", 1), ("body", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate(_)));
        let stored = store.find_by_id(Collection::Comments, "c1").await.unwrap().unwrap();
        assert_eq!(stored["upvotes"], 0);
    }

    #[tokio::test]
    async fn increment_overflow_is_rejected_and_leaves_document() {
        let store = MemoryStore::new();
        store
            .insert(
                Collection::Posts,
                doc(json!({"_id": "p1", "upvotes": i64::MAX, "downvotes": 0})),
            )
            .await
            .unwrap();

        let err = store
            .increment(Collection::Posts, "p1", &[("downvotes", 1), ("upvotes", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate(_)));

        let stored = store.find_by_id(Collection::Posts, "p1").await.unwrap().unwrap();
        assert_eq!(stored["upvotes"], i64::MAX);
        assert_eq!(stored["downvotes"], 0);
    }

    #[tokio::test]
    async fn increment_missing_document_is_no_match() {
        let store = MemoryStore::new();
        let err = store
            .increment(Collection::Posts, "nope", &[("upvotes", 1)])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NoMatch {
                collection: Collection::Posts,
                id: "nope".into()
            }
        );
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::open(&path).await.unwrap();
        store
            .upsert(Collection::Subreddits, doc(json!({"_id": "s1", "name": "rust"})))
            .await
            .unwrap();
        store
            .insert(Collection::Posts, doc(json!({"_id": "p1", "upvotes": 0})))
            .await
            .unwrap();
        store
            .increment(Collection::Posts, "p1", &[("upvotes", 2)])
            .await
            .unwrap();
        drop(store);

        let reopened = MemoryStore::open(&path).await.unwrap();
        let post = reopened.find_by_id(Collection::Posts, "p1").await.unwrap().unwrap();
        assert_eq!(post["upvotes"], 2);
        assert!(reopened
            .find_by_id(Collection::Subreddits, "s1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = MemoryStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
