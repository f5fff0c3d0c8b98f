use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::LinkedAccount;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTokenResponse {
    pub success: bool,
    pub link_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub public_token: String,
}

/// Client-facing view of a linked account; the encrypted token stays out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub plaid_account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub mask: Option<String>,
    pub current_balance: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&LinkedAccount> for AccountView {
    fn from(a: &LinkedAccount) -> Self {
        Self {
            id: a.id,
            plaid_account_id: a.plaid_account_id.clone(),
            name: a.name.clone(),
            official_name: a.official_name.clone(),
            account_type: a.account_type.clone(),
            mask: a.mask.clone(),
            current_balance: a.current_balance,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub success: bool,
    pub accounts: Vec<AccountView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub added: usize,
    pub newly_categorized: usize,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
