use uuid::Uuid;

use super::model::Transaction;
use crate::store::{self, Store};

const COLLECTION: &str = "transactions";

pub async fn list(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<Transaction>> {
    store::load_list(store, user_id, COLLECTION).await
}

pub async fn save_all(
    store: &dyn Store,
    user_id: Uuid,
    transactions: &[Transaction],
) -> anyhow::Result<()> {
    store::save_list(store, user_id, COLLECTION, transactions).await
}

pub async fn append(
    store: &dyn Store,
    user_id: Uuid,
    new_rows: Vec<Transaction>,
) -> anyhow::Result<()> {
    let mut all = list(store, user_id).await?;
    all.extend(new_rows);
    save_all(store, user_id, &all).await
}
