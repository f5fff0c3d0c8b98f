use uuid::Uuid;

use super::model::LinkedAccount;
use crate::store::{self, Store};

const COLLECTION: &str = "accounts";

pub async fn list(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<LinkedAccount>> {
    store::load_list(store, user_id, COLLECTION).await
}

pub async fn save_all(
    store: &dyn Store,
    user_id: Uuid,
    accounts: &[LinkedAccount],
) -> anyhow::Result<()> {
    store::save_list(store, user_id, COLLECTION, accounts).await
}
