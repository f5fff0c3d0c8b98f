use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    SplitRequest, SplitResponse, TagListResponse, TransactionListResponse, TransactionQuery,
    TransactionResponse, UpdateTransactionRequest,
};
use super::filter::{self, TransactionFilter};
use super::model::Transaction;
use super::repo;
use crate::auth::services::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/tags", get(list_tags))
        .route("/transactions/:id", put(update_transaction))
        .route("/transactions/:id/split", post(split_transaction))
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let filter = TransactionFilter::from_query(&query)?;
    let all = repo::list(state.store.as_ref(), user_id).await?;
    let outcome = filter::run(&filter, all);
    Ok(Json(TransactionListResponse {
        success: true,
        transactions: outcome.transactions,
        total_count: outcome.total_count,
        unfiltered_total: outcome.unfiltered_total,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let mut all = repo::list(state.store.as_ref(), user_id).await?;
    let txn = all
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(ApiError::NotFound("Transaction"))?;

    if let Some(category_id) = payload.user_category_id {
        if let Some(category_id) = category_id {
            let categories =
                crate::categories::repo::list(state.store.as_ref(), user_id).await?;
            if !categories.iter().any(|c| c.id == category_id) {
                return Err(ApiError::NotFound("Category"));
            }
        }
        txn.user_category_id = category_id;
    }
    if let Some(description) = payload.user_description {
        txn.user_description = description;
    }
    if let Some(notes) = payload.notes {
        txn.notes = notes;
    }
    if let Some(tags) = payload.tags {
        txn.tags = tags;
    }
    if let Some(hidden) = payload.is_hidden {
        txn.is_hidden = hidden;
    }

    let updated = txn.clone();
    repo::save_all(state.store.as_ref(), user_id, &all).await?;
    Ok(Json(TransactionResponse {
        success: true,
        transaction: updated,
    }))
}

#[instrument(skip(state, payload))]
pub async fn split_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SplitRequest>,
) -> Result<Json<SplitResponse>, ApiError> {
    if payload.parts.len() < 2 {
        return Err(ApiError::Invalid("parts: a split needs at least 2 parts".into()));
    }

    let mut all = repo::list(state.store.as_ref(), user_id).await?;
    let parent_index = all
        .iter()
        .position(|t| t.id == id)
        .ok_or(ApiError::NotFound("Transaction"))?;
    let parent = all[parent_index].clone();
    if parent.is_split {
        return Err(ApiError::Invalid("transaction: already split".into()));
    }

    let sum: f64 = payload.parts.iter().map(|p| p.amount).sum();
    if (sum - parent.amount).abs() > 0.005 {
        return Err(ApiError::Invalid(format!(
            "parts: amounts sum to {sum:.2}, expected {:.2}",
            parent.amount
        )));
    }

    let children: Vec<Transaction> = payload
        .parts
        .into_iter()
        .map(|part| Transaction {
            id: Uuid::new_v4(),
            plaid_transaction_id: None,
            amount: part.amount,
            user_description: part.user_description,
            user_category_id: part.user_category_id,
            tags: BTreeSet::new(),
            notes: None,
            is_hidden: false,
            pending: false,
            is_split: false,
            parent_transaction_id: Some(parent.id),
            ..parent.clone()
        })
        .collect();

    // The parent stays for the audit trail but leaves the default views
    let parent_row = &mut all[parent_index];
    parent_row.is_split = true;
    parent_row.is_hidden = true;
    let parent = parent_row.clone();

    all.extend(children.clone());
    repo::save_all(state.store.as_ref(), user_id, &all).await?;

    info!(transaction_id = %id, parts = children.len(), "transaction split");
    Ok(Json(SplitResponse {
        success: true,
        parent,
        children,
    }))
}

#[instrument(skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TagListResponse>, ApiError> {
    let all = repo::list(state.store.as_ref(), user_id).await?;
    let tags: BTreeSet<String> = all.into_iter().flat_map(|t| t.tags).collect();
    Ok(Json(TagListResponse {
        success: true,
        tags: tags.into_iter().collect(),
    }))
}
