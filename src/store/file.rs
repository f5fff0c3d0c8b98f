use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::Store;

/// File backend: `data_dir/<user>/<collection>.json`.
///
/// Writes go through a temp file followed by a rename so a crash mid-write
/// never leaves a truncated document behind.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn doc_path(&self, user_id: Uuid, collection: &str) -> PathBuf {
        self.data_dir
            .join(user_id.to_string())
            .join(format!("{collection}.json"))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn load(
        &self,
        user_id: Uuid,
        collection: &str,
    ) -> anyhow::Result<Option<serde_json::Value>> {
        let path = self.doc_path(user_id, collection);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(
        &self,
        user_id: Uuid,
        collection: &str,
        doc: serde_json::Value,
    ) -> anyhow::Result<()> {
        let path = self.doc_path(user_id, collection);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = tmp_path(&path);
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&doc)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, collection: &str) -> anyhow::Result<()> {
        let path = self.doc_path(user_id, collection);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{load_list, save_list};

    #[tokio::test]
    async fn roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let user = Uuid::new_v4();
        save_list(&store, user, "categories", &["Groceries".to_string()])
            .await
            .unwrap();
        let names: Vec<String> = load_list(&store, user, "categories").await.unwrap();
        assert_eq!(names, vec!["Groceries"]);
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load(Uuid::new_v4(), "budgets").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let user = Uuid::new_v4();
        store.delete(user, "budgets").await.unwrap();
        save_list(&store, user, "budgets", &[1, 2, 3]).await.unwrap();
        store.delete(user, "budgets").await.unwrap();
        assert!(store.load(user, "budgets").await.unwrap().is_none());
    }
}
