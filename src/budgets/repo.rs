use uuid::Uuid;

use super::model::Budget;
use crate::store::{self, Store};

const COLLECTION: &str = "budgets";

pub async fn list(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<Budget>> {
    store::load_list(store, user_id, COLLECTION).await
}

pub async fn save_all(store: &dyn Store, user_id: Uuid, budgets: &[Budget]) -> anyhow::Result<()> {
    store::save_list(store, user_id, COLLECTION, budgets).await
}
