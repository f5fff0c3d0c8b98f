use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::dates::iso_date;

/// A bank transaction. Amounts follow the Plaid sign convention: negative is
/// income (a credit), anything else (including exactly zero) is an expense.
/// Rows are never hard-deleted in normal flows, only hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub plaid_transaction_id: Option<String>,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub name: String,
    pub merchant_name: Option<String>,
    /// User-edited display description. Deliberately not part of the search
    /// index (see the filter module).
    pub user_description: Option<String>,
    /// Plaid's own category path, kept verbatim.
    #[serde(default)]
    pub category: Vec<String>,
    pub user_category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub is_split: bool,
    pub parent_transaction_id: Option<Uuid>,
}

impl Transaction {
    /// Plaid convention: negative amount is income.
    pub fn is_income(&self) -> bool {
        self.amount < 0.0
    }
}
