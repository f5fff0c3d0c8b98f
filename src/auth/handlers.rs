use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{
        AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, PublicUser,
        RefreshRequest, RegisterRequest, ResetPasswordRequest,
    },
    repo,
    services::{hash_password, is_valid_email, verify_password, AuthUser, JwtKeys},
};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/me", get(get_me))
}

fn token_pair(state: &AppState, user: &repo::User) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        success: true,
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email.clone(),
        },
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !state.limiter.check(&payload.email) {
        warn!(email = %payload.email, "register rate limited");
        return Err(ApiError::RateLimited);
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Invalid("email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Invalid("password: must be at least 8 characters".into()));
    }
    if repo::find_by_email(state.store.as_ref(), &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(state.store.as_ref(), &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(token_pair(&state, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !state.limiter.check(&payload.email) {
        warn!(email = %payload.email, "login rate limited");
        return Err(ApiError::RateLimited);
    }

    let user = repo::find_by_email(state.store.as_ref(), &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(token_pair(&state, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = repo::find_by_id(state.store.as_ref(), claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(token_pair(&state, &user)?))
}

/// The reset token is written to the server log rather than emailed; the
/// response is identical whether or not the address exists.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if let Some(user) = repo::find_by_email(state.store.as_ref(), &payload.email).await? {
        let token = state.reset_tokens.issue(user.id);
        info!(user_id = %user.id, reset_token = %token, "password reset token issued");
    } else {
        warn!(email = %payload.email, "password reset for unknown email");
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "If the account exists, a reset token was logged on the server".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::Invalid("password: must be at least 8 characters".into()));
    }
    let user_id = state
        .reset_tokens
        .take(&payload.token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired reset token".into()))?;

    let hash = hash_password(&payload.new_password)?;
    if !repo::update_password(state.store.as_ref(), user_id, &hash).await? {
        return Err(ApiError::NotFound("User"));
    }

    info!(user_id = %user_id, "password reset");
    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated".into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = repo::find_by_id(state.store.as_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}
