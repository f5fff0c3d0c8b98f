use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;

/// In-memory backend, used by unit tests and `AppState::fake`.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(Uuid, String), serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(
        &self,
        user_id: Uuid,
        collection: &str,
    ) -> anyhow::Result<Option<serde_json::Value>> {
        let docs = self.docs.read().await;
        Ok(docs.get(&(user_id, collection.to_string())).cloned())
    }

    async fn save(
        &self,
        user_id: Uuid,
        collection: &str,
        doc: serde_json::Value,
    ) -> anyhow::Result<()> {
        let mut docs = self.docs.write().await;
        docs.insert((user_id, collection.to_string()), doc);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, collection: &str) -> anyhow::Result<()> {
        let mut docs = self.docs.write().await;
        docs.remove(&(user_id, collection.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{load_list, save_list};

    #[tokio::test]
    async fn load_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.load(Uuid::new_v4(), "transactions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        save_list(&store, user, "tags", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let tags: Vec<String> = load_list(&store, user, "tags").await.unwrap();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn collections_are_isolated_per_user() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        save_list(&store, alice, "tags", &["x".to_string()]).await.unwrap();
        let tags: Vec<String> = load_list(&store, bob, "tags").await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        save_list(&store, user, "tags", &["x".to_string()]).await.unwrap();
        store.delete(user, "tags").await.unwrap();
        assert!(store.load(user, "tags").await.unwrap().is_none());
    }
}
