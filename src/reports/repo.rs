use uuid::Uuid;

use super::model::ActualsOverride;
use crate::store::{self, Store};

const COLLECTION: &str = "actuals";

pub async fn list(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<ActualsOverride>> {
    store::load_list(store, user_id, COLLECTION).await
}

pub async fn save_all(
    store: &dyn Store,
    user_id: Uuid,
    overrides: &[ActualsOverride],
) -> anyhow::Result<()> {
    store::save_list(store, user_id, COLLECTION, overrides).await
}
