use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    AccountListResponse, AccountView, ExchangeRequest, LinkTokenResponse, SuccessResponse,
    SyncResponse,
};
use super::model::LinkedAccount;
use super::{repo, services};
use crate::auth::services::AuthUser;
use crate::crypto;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transactions;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plaid/link-token", post(create_link_token))
        .route("/plaid/exchange", post(exchange_public_token))
        .route("/plaid/sync", post(sync))
        .route("/accounts", get(list_accounts))
        .route("/accounts/:id", delete(unlink_account))
}

#[instrument(skip(state))]
pub async fn create_link_token(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<LinkTokenResponse>, ApiError> {
    let link_token = state.plaid.create_link_token(user_id).await?;
    Ok(Json(LinkTokenResponse {
        success: true,
        link_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn exchange_public_token(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ExchangeRequest>,
) -> Result<Json<AccountListResponse>, ApiError> {
    if payload.public_token.trim().is_empty() {
        return Err(ApiError::Invalid("publicToken: must not be empty".into()));
    }

    let exchanged = state
        .plaid
        .exchange_public_token(&payload.public_token)
        .await?;
    let encrypted_token = crypto::encrypt(&exchanged.access_token, &state.config.token_password)
        .map_err(anyhow::Error::from)?;
    let plaid_accounts = state.plaid.accounts(&exchanged.access_token).await?;

    let mut accounts = repo::list(state.store.as_ref(), user_id).await?;
    let now = OffsetDateTime::now_utc();
    let mut linked = 0usize;
    for account in plaid_accounts {
        if accounts
            .iter()
            .any(|a| a.plaid_account_id == account.plaid_account_id)
        {
            continue;
        }
        accounts.push(LinkedAccount {
            id: Uuid::new_v4(),
            user_id,
            plaid_item_id: exchanged.item_id.clone(),
            plaid_account_id: account.plaid_account_id,
            encrypted_access_token: encrypted_token.clone(),
            name: account.name,
            official_name: account.official_name,
            account_type: account.account_type,
            mask: account.mask,
            current_balance: account.current_balance,
            sync_cursor: None,
            created_at: now,
        });
        linked += 1;
    }
    repo::save_all(state.store.as_ref(), user_id, &accounts).await?;

    info!(user_id = %user_id, item_id = %exchanged.item_id, linked, "plaid item linked");
    Ok(Json(AccountListResponse {
        success: true,
        accounts: accounts.iter().map(AccountView::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn sync(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SyncResponse>, ApiError> {
    let outcome = services::sync_user(&state, user_id).await?;
    Ok(Json(SyncResponse {
        success: true,
        added: outcome.added,
        newly_categorized: outcome.newly_categorized,
    }))
}

#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AccountListResponse>, ApiError> {
    let accounts = repo::list(state.store.as_ref(), user_id).await?;
    Ok(Json(AccountListResponse {
        success: true,
        accounts: accounts.iter().map(AccountView::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn unlink_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut accounts = repo::list(state.store.as_ref(), user_id).await?;
    let before = accounts.len();
    accounts.retain(|a| a.id != id);
    if accounts.len() == before {
        return Err(ApiError::NotFound("Account"));
    }
    repo::save_all(state.store.as_ref(), user_id, &accounts).await?;

    // Keep the history but take it out of every default view.
    let mut txns = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let mut hidden = 0usize;
    for txn in txns.iter_mut().filter(|t| t.account_id == id) {
        if !txn.is_hidden {
            txn.is_hidden = true;
            hidden += 1;
        }
    }
    transactions::repo::save_all(state.store.as_ref(), user_id, &txns).await?;

    info!(account_id = %id, hidden, "account unlinked");
    Ok(Json(SuccessResponse { success: true }))
}
