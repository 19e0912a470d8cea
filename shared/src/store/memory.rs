use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::store::DocumentStore;

/// In-process document store keyed by (collection, id).
///
/// Stands in for the managed store in tests; no persistence, no ordering
/// guarantees beyond HashMap iteration.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn stream_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_returns_document_unchanged() {
        let store = MemoryStore::new();
        let doc = json!({"id": 7, "model": "Panda"});

        store.set("auto", "7", doc.clone()).await.unwrap();

        assert_eq!(store.get("auto", "7").await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn get_of_missing_document_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("auto", "999").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_existing_document() {
        let store = MemoryStore::new();
        store.set("auto", "7", json!({"model": "Panda"})).await.unwrap();
        store.set("auto", "7", json!({"model": "Tipo"})).await.unwrap();

        assert_eq!(
            store.get("auto", "7").await.unwrap(),
            Some(json!({"model": "Tipo"}))
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("auto", "7", json!({"model": "Panda"})).await.unwrap();

        store.delete("auto", "7").await.unwrap();
        store.delete("auto", "7").await.unwrap();

        assert_eq!(store.get("auto", "7").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stream_all_returns_every_document() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .set("auto", &i.to_string(), json!({"id": i}))
                .await
                .unwrap();
        }

        let docs = store.stream_all("auto").await.unwrap();
        assert_eq!(docs.len(), 5);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store.set("auto", "5", json!({"id": 5})).await.unwrap();

        assert_eq!(store.get("commerciali", "5").await.unwrap(), None);
        assert!(store.stream_all("commerciali").await.unwrap().is_empty());
    }
}
