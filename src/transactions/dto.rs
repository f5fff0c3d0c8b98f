use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Transaction;

/// Query parameters of `GET /transactions`. List-valued parameters are
/// comma-separated; unknown `transactionType` values are rejected rather
/// than silently widened.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub transaction_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub account_ids: Option<String>,
    pub category_ids: Option<String>,
    pub only_uncategorized: Option<bool>,
    pub tags: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub include_hidden: Option<bool>,
    pub include_pending: Option<bool>,
    pub search_query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListResponse {
    pub success: bool,
    pub transactions: Vec<Transaction>,
    /// Count after all filters.
    pub total_count: usize,
    /// Count after date/account filters only ("N of M in range").
    pub unfiltered_total: usize,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    #[serde(default, with = "double_option")]
    pub user_category_id: Option<Option<Uuid>>,
    #[serde(default, with = "double_option")]
    pub user_description: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub notes: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub is_hidden: Option<bool>,
}

/// Distinguishes "field absent" from "field set to null" so a client can
/// clear a category or note explicitly.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: Transaction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPart {
    pub amount: f64,
    pub user_category_id: Option<Uuid>,
    pub user_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    pub parts: Vec<SplitPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResponse {
    pub success: bool,
    pub parent: Transaction,
    pub children: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub success: bool,
    pub tags: Vec<String>,
}
