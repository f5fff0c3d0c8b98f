use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    BudgetListResponse, BudgetQuery, BudgetResponse, BudgetStatus, BudgetStatusResponse,
    CreateBudgetRequest, SuccessResponse, UpdateBudgetRequest,
};
use super::model::Budget;
use super::{repo, services};
use crate::auth::services::AuthUser;
use crate::categories;
use crate::dates::is_valid_month;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transactions;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/status", get(budget_status))
        .route("/budgets/:id", put(update_budget).delete(delete_budget))
}

#[instrument(skip(state))]
pub async fn list_budgets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<BudgetListResponse>, ApiError> {
    if let Some(month) = &query.month {
        if !is_valid_month(month) {
            return Err(ApiError::Invalid("month: expected YYYY-MM".into()));
        }
    }
    let mut budgets = repo::list(state.store.as_ref(), user_id).await?;
    if let Some(month) = &query.month {
        budgets.retain(|b| &b.month == month);
    }
    Ok(Json(BudgetListResponse {
        success: true,
        budgets,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateBudgetRequest>,
) -> Result<Json<BudgetResponse>, ApiError> {
    if !is_valid_month(&payload.month) {
        return Err(ApiError::Invalid("month: expected YYYY-MM".into()));
    }
    if payload.amount < 0.0 {
        return Err(ApiError::Invalid("amount: must not be negative".into()));
    }
    let cats = categories::repo::list(state.store.as_ref(), user_id).await?;
    if !cats.iter().any(|c| c.id == payload.category_id) {
        return Err(ApiError::NotFound("Category"));
    }

    let mut budgets = repo::list(state.store.as_ref(), user_id).await?;
    if budgets
        .iter()
        .any(|b| b.category_id == payload.category_id && b.month == payload.month)
    {
        return Err(ApiError::Conflict(
            "Budget already exists for this category and month".into(),
        ));
    }

    let budget = Budget {
        id: Uuid::new_v4(),
        category_id: payload.category_id,
        month: payload.month,
        amount: payload.amount,
        rollover: payload.rollover,
    };
    budgets.push(budget.clone());
    repo::save_all(state.store.as_ref(), user_id, &budgets).await?;

    info!(budget_id = %budget.id, month = %budget.month, "budget created");
    Ok(Json(BudgetResponse {
        success: true,
        budget,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBudgetRequest>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let mut budgets = repo::list(state.store.as_ref(), user_id).await?;
    let budget = budgets
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or(ApiError::NotFound("Budget"))?;

    if let Some(amount) = payload.amount {
        if amount < 0.0 {
            return Err(ApiError::Invalid("amount: must not be negative".into()));
        }
        budget.amount = amount;
    }
    if let Some(rollover) = payload.rollover {
        budget.rollover = rollover;
    }

    let updated = budget.clone();
    repo::save_all(state.store.as_ref(), user_id, &budgets).await?;
    Ok(Json(BudgetResponse {
        success: true,
        budget: updated,
    }))
}

#[instrument(skip(state))]
pub async fn delete_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut budgets = repo::list(state.store.as_ref(), user_id).await?;
    let before = budgets.len();
    budgets.retain(|b| b.id != id);
    if budgets.len() == before {
        return Err(ApiError::NotFound("Budget"));
    }
    repo::save_all(state.store.as_ref(), user_id, &budgets).await?;
    info!(budget_id = %id, "budget deleted");
    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip(state))]
pub async fn budget_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<BudgetStatusResponse>, ApiError> {
    let month = query
        .month
        .ok_or_else(|| ApiError::Invalid("month: required".into()))?;
    if !is_valid_month(&month) {
        return Err(ApiError::Invalid("month: expected YYYY-MM".into()));
    }

    let budgets = repo::list(state.store.as_ref(), user_id).await?;
    let txns = transactions::repo::list(state.store.as_ref(), user_id).await?;

    let statuses = budgets
        .iter()
        .filter(|b| b.month == month)
        .map(|b| {
            let effective = services::effective_amount(b, &budgets, &txns);
            let spent = services::spent_in_month(&txns, b.category_id, &b.month);
            BudgetStatus {
                budget: b.clone(),
                effective_amount: effective,
                spent,
                remaining: effective - spent,
            }
        })
        .collect();

    Ok(Json(BudgetStatusResponse {
        success: true,
        statuses,
    }))
}
