use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{self, Store};

const COLLECTION: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn find_by_email(store: &dyn Store, email: &str) -> anyhow::Result<Option<User>> {
    let users: Vec<User> = store::load_list(store, store::GLOBAL, COLLECTION).await?;
    Ok(users.into_iter().find(|u| u.email == email))
}

pub async fn find_by_id(store: &dyn Store, id: Uuid) -> anyhow::Result<Option<User>> {
    let users: Vec<User> = store::load_list(store, store::GLOBAL, COLLECTION).await?;
    Ok(users.into_iter().find(|u| u.id == id))
}

pub async fn create(store: &dyn Store, email: &str, password_hash: &str) -> anyhow::Result<User> {
    let mut users: Vec<User> = store::load_list(store, store::GLOBAL, COLLECTION).await?;
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    users.push(user.clone());
    store::save_list(store, store::GLOBAL, COLLECTION, &users).await?;
    Ok(user)
}

pub async fn update_password(
    store: &dyn Store,
    id: Uuid,
    password_hash: &str,
) -> anyhow::Result<bool> {
    let mut users: Vec<User> = store::load_list(store, store::GLOBAL, COLLECTION).await?;
    let Some(user) = users.iter_mut().find(|u| u.id == id) else {
        return Ok(false);
    };
    user.password_hash = password_hash.to_string();
    store::save_list(store, store::GLOBAL, COLLECTION, &users).await?;
    Ok(true)
}
