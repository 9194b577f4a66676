//! In-memory document partition
//!
//! DashMap-backed path → JSON map with a broadcast channel for listeners.
//! Writers win in arrival order; listeners see a last-writer-wins stream
//! and are expected to drop changes for paths they are editing locally.

use chrono::Utc;
use dashmap::DashMap;
use log::debug;
use tokio::sync::broadcast;

use crate::domain::{Document, DocumentChange, DocumentStore, DomainError, DomainResult};

/// Change channel capacity per partition
const CHANGE_CAPACITY: usize = 256;

pub struct MemoryDocumentStore {
    name: String,
    docs: DashMap<String, Document>,
    changes: broadcast::Sender<DocumentChange>,
}

impl MemoryDocumentStore {
    pub fn new(name: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            name: name.into(),
            docs: DashMap::new(),
            changes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn publish(&self, path: &str, value: Option<Document>) {
        // No receivers is normal when no console is watching
        let _ = self.changes.send(DocumentChange {
            path: path.to_string(),
            value,
            timestamp: Utc::now(),
        });
    }
}

fn normalize(path: &str) -> DomainResult<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(DomainError::Validation("empty document path".to_string()));
    }
    Ok(trimmed.to_string())
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, path: &str) -> DomainResult<Option<Document>> {
        let path = normalize(path)?;
        Ok(self.docs.get(&path).map(|doc| doc.clone()))
    }

    async fn set(&self, path: &str, value: Document) -> DomainResult<()> {
        let path = normalize(path)?;
        debug!("[{}] set {}", self.name, path);
        self.docs.insert(path.clone(), value.clone());
        self.publish(&path, Some(value));
        Ok(())
    }

    async fn update(
        &self,
        path: &str,
        fields: serde_json::Map<String, Document>,
    ) -> DomainResult<()> {
        let path = normalize(path)?;

        let merged = {
            let mut entry = self
                .docs
                .get_mut(&path)
                .ok_or_else(|| DomainError::not_found("document", "path", path.clone()))?;

            let target = entry.value_mut();
            match target.as_object_mut() {
                Some(obj) => {
                    for (key, value) in fields {
                        obj.insert(key, value);
                    }
                }
                None => {
                    return Err(DomainError::Validation(format!(
                        "document at {} is not an object",
                        path
                    )));
                }
            }
            target.clone()
        };

        debug!("[{}] update {}", self.name, path);
        self.publish(&path, Some(merged));
        Ok(())
    }

    async fn remove(&self, path: &str) -> DomainResult<()> {
        let path = normalize(path)?;
        if self.docs.remove(&path).is_some() {
            debug!("[{}] remove {}", self.name, path);
            self.publish(&path, None);
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> DomainResult<Vec<(String, Document)>> {
        let prefix = normalize(prefix)?;
        let lead = format!("{}/", prefix);

        let mut items: Vec<(String, Document)> = self
            .docs
            .iter()
            .filter_map(|entry| {
                let key = entry.key().strip_prefix(&lead)?;
                // direct children only
                if key.is_empty() || key.contains('/') {
                    return None;
                }
                Some((key.to_string(), entry.value().clone()))
            })
            .collect();

        items.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(items)
    }

    fn listen(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_fetch_remove() {
        let store = MemoryDocumentStore::new("test");

        store.set("slots/a", json!({"name": "A"})).await.unwrap();
        let doc = store.fetch("slots/a").await.unwrap().unwrap();
        assert_eq!(doc["name"], "A");

        store.remove("slots/a").await.unwrap();
        assert!(store.fetch("slots/a").await.unwrap().is_none());

        // removing again is a no-op
        store.remove("slots/a").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryDocumentStore::new("test");
        store
            .set("slots/a", json!({"name": "A", "enabled": true}))
            .await
            .unwrap();

        let mut fields = serde_json::Map::new();
        fields.insert("enabled".to_string(), json!(false));
        store.update("slots/a", fields).await.unwrap();

        let doc = store.fetch("slots/a").await.unwrap().unwrap();
        assert_eq!(doc["name"], "A");
        assert_eq!(doc["enabled"], false);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryDocumentStore::new("test");
        let err = store
            .update("slots/missing", serde_json::Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_direct_children_sorted() {
        let store = MemoryDocumentStore::new("test");
        store.set("slots/b", json!({"n": 2})).await.unwrap();
        store.set("slots/a", json!({"n": 1})).await.unwrap();
        store.set("slots/a/nested", json!({"n": 3})).await.unwrap();
        store.set("credentials/x", json!({})).await.unwrap();

        let items = store.list("slots").await.unwrap();
        let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_listen_receives_changes() {
        let store = MemoryDocumentStore::new("test");
        let mut rx = store.listen();

        store.set("copy", json!({"welcome": "hi"})).await.unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.path, "copy");
        assert!(change.value.is_some());

        store.remove("copy").await.unwrap();
        let change = rx.recv().await.unwrap();
        assert!(change.value.is_none());
    }
}
