use uuid::Uuid;

use super::model::AutoCategorizeRule;
use crate::store::{self, Store};

const COLLECTION: &str = "autocategorize-rules";

pub async fn list(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<AutoCategorizeRule>> {
    let mut rules: Vec<AutoCategorizeRule> =
        store::load_list(store, user_id, COLLECTION).await?;
    rules.sort_by_key(|r| r.priority);
    Ok(rules)
}

pub async fn save_all(
    store: &dyn Store,
    user_id: Uuid,
    rules: &[AutoCategorizeRule],
) -> anyhow::Result<()> {
    store::save_list(store, user_id, COLLECTION, rules).await
}
