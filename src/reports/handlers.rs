use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{
    ActualsListResponse, ActualsResponse, CashflowQuery, CashflowResponse, PutActualsRequest,
    SpendingQuery, SpendingResponse, SuccessResponse,
};
use super::model::ActualsOverride;
use super::{repo, services};
use crate::auth::services::AuthUser;
use crate::categories;
use crate::dates::{is_valid_month, parse_date};
use crate::error::ApiError;
use crate::state::AppState;
use crate::transactions;

const DEFAULT_CASHFLOW_MONTHS: usize = 6;
const MAX_CASHFLOW_MONTHS: usize = 60;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/spending", get(spending))
        .route("/reports/cashflow", get(cashflow))
        .route("/reports/actuals", get(list_actuals))
        .route("/reports/actuals/:month", put(put_actuals).delete(delete_actuals))
}

#[instrument(skip(state))]
pub async fn spending(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SpendingQuery>,
) -> Result<Json<SpendingResponse>, ApiError> {
    let start = query
        .start_date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| ApiError::Invalid("startDate: expected YYYY-MM-DD".into()))?;
    let end = query
        .end_date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| ApiError::Invalid("endDate: expected YYYY-MM-DD".into()))?;
    if end < start {
        return Err(ApiError::Invalid("endDate: before startDate".into()));
    }

    let cats = categories::repo::list(state.store.as_ref(), user_id).await?;
    let txns = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let slices = services::spending_breakdown(&cats, &txns, start, end, query.parent_id)?;
    let total = slices.iter().map(|s| s.value).sum();
    Ok(Json(SpendingResponse {
        success: true,
        slices,
        total,
    }))
}

#[instrument(skip(state))]
pub async fn cashflow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<CashflowQuery>,
) -> Result<Json<CashflowResponse>, ApiError> {
    let months = query.months.unwrap_or(DEFAULT_CASHFLOW_MONTHS);
    if months == 0 || months > MAX_CASHFLOW_MONTHS {
        return Err(ApiError::Invalid(format!(
            "months: expected 1..={MAX_CASHFLOW_MONTHS}"
        )));
    }

    let txns = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let overrides = repo::list(state.store.as_ref(), user_id).await?;
    let today = OffsetDateTime::now_utc().date();
    let (rows, projection) = services::cashflow(&txns, &overrides, today, months);
    Ok(Json(CashflowResponse {
        success: true,
        months: rows,
        projection,
    }))
}

#[instrument(skip(state))]
pub async fn list_actuals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ActualsListResponse>, ApiError> {
    let overrides = repo::list(state.store.as_ref(), user_id).await?;
    Ok(Json(ActualsListResponse {
        success: true,
        overrides,
    }))
}

/// Upsert: one override per month.
#[instrument(skip(state, payload))]
pub async fn put_actuals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(month): Path<String>,
    Json(payload): Json<PutActualsRequest>,
) -> Result<Json<ActualsResponse>, ApiError> {
    if !is_valid_month(&month) {
        return Err(ApiError::Invalid("month: expected YYYY-MM".into()));
    }
    let mut overrides = repo::list(state.store.as_ref(), user_id).await?;
    overrides.retain(|o| o.month != month);
    let entry = ActualsOverride {
        month: month.clone(),
        total_income: payload.total_income,
        total_expenses: payload.total_expenses,
    };
    overrides.push(entry.clone());
    repo::save_all(state.store.as_ref(), user_id, &overrides).await?;
    info!(%month, "actuals override saved");
    Ok(Json(ActualsResponse {
        success: true,
        actuals_override: entry,
    }))
}

#[instrument(skip(state))]
pub async fn delete_actuals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(month): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut overrides = repo::list(state.store.as_ref(), user_id).await?;
    let before = overrides.len();
    overrides.retain(|o| o.month != month);
    if overrides.len() == before {
        return Err(ApiError::NotFound("Actuals override"));
    }
    repo::save_all(state.store.as_ref(), user_id, &overrides).await?;
    Ok(Json(SuccessResponse { success: true }))
}
