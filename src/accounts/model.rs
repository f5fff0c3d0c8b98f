use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A bank account linked through Plaid. The access token is stored only in
/// encrypted form (see the crypto module) and never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plaid_item_id: String,
    pub plaid_account_id: String,
    pub encrypted_access_token: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub mask: Option<String>,
    pub current_balance: f64,
    /// Plaid sync cursor; `None` until the first transaction pull.
    pub sync_cursor: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
