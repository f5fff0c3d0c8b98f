use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Budget;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub category_id: Uuid,
    pub month: String,
    pub amount: f64,
    #[serde(default)]
    pub rollover: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    pub amount: Option<f64>,
    pub rollover: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BudgetListResponse {
    pub success: bool,
    pub budgets: Vec<Budget>,
}

#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub success: bool,
    pub budget: Budget,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// One budget with its month-to-date numbers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub effective_amount: f64,
    pub spent: f64,
    pub remaining: f64,
}

#[derive(Debug, Serialize)]
pub struct BudgetStatusResponse {
    pub success: bool,
    pub statuses: Vec<BudgetStatus>,
}
