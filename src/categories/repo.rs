use uuid::Uuid;

use super::model::Category;
use crate::store::{self, Store};

const COLLECTION: &str = "categories";

pub async fn list(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<Category>> {
    store::load_list(store, user_id, COLLECTION).await
}

pub async fn save_all(
    store: &dyn Store,
    user_id: Uuid,
    categories: &[Category],
) -> anyhow::Result<()> {
    store::save_list(store, user_id, COLLECTION, categories).await
}
