use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bucketing::BreakdownSlice;
use super::model::ActualsOverride;
use super::services::{CashflowProjection, MonthCashflow};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SpendingResponse {
    pub success: bool,
    pub slices: Vec<BreakdownSlice>,
    pub total: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CashflowQuery {
    pub months: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CashflowResponse {
    pub success: bool,
    pub months: Vec<MonthCashflow>,
    pub projection: Option<CashflowProjection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutActualsRequest {
    pub total_income: f64,
    pub total_expenses: f64,
}

#[derive(Debug, Serialize)]
pub struct ActualsListResponse {
    pub success: bool,
    pub overrides: Vec<ActualsOverride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualsResponse {
    pub success: bool,
    pub actuals_override: ActualsOverride,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
