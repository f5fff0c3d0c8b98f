//! Repository layer: one JSON document per `(user, collection)`.
//!
//! Domain repos serialize their whole collection through [`Store`] so the
//! backend can be swapped: [`MemoryStore`] for tests, [`FileStore`] for
//! production. Reads and writes of a document are atomic from the caller's
//! point of view; there is no cross-document transaction.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Owner id for collections that are not scoped to a user (e.g. `users`).
pub const GLOBAL: Uuid = Uuid::nil();

#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self, user_id: Uuid, collection: &str)
        -> anyhow::Result<Option<serde_json::Value>>;
    async fn save(
        &self,
        user_id: Uuid,
        collection: &str,
        doc: serde_json::Value,
    ) -> anyhow::Result<()>;
    async fn delete(&self, user_id: Uuid, collection: &str) -> anyhow::Result<()>;
}

/// Load a collection as a typed list; a missing document is an empty list.
pub async fn load_list<T: DeserializeOwned>(
    store: &dyn Store,
    user_id: Uuid,
    collection: &str,
) -> anyhow::Result<Vec<T>> {
    match store.load(user_id, collection).await? {
        Some(doc) => Ok(serde_json::from_value(doc)?),
        None => Ok(Vec::new()),
    }
}

pub async fn save_list<T: Serialize>(
    store: &dyn Store,
    user_id: Uuid,
    collection: &str,
    items: &[T],
) -> anyhow::Result<()> {
    store
        .save(user_id, collection, serde_json::to_value(items)?)
        .await
}
