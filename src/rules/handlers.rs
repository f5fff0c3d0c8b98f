use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateRuleRequest, MoveRuleRequest, RuleListResponse, RuleResponse, RunRequest, RunResponse,
    SuccessResponse, UpdateRuleRequest,
};
use super::engine::{self, ApplyMode};
use super::model::{AutoCategorizeRule, MAX_PATTERNS};
use super::repo;
use crate::auth::services::AuthUser;
use crate::categories;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transactions;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/autocategorize-rules", get(list_rules).post(create_rule))
        .route(
            "/autocategorize-rules/:id",
            put(update_rule).delete(delete_rule),
        )
        .route("/autocategorize-rules/:id/move", post(move_rule))
        .route("/autocategorize-rules/preview", post(preview_rules))
        .route("/autocategorize-rules/apply", post(apply_rules))
}

fn normalize_patterns(patterns: Vec<String>) -> Result<Vec<String>, ApiError> {
    let patterns: Vec<String> = patterns
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return Err(ApiError::Invalid("patterns: at least one non-empty pattern".into()));
    }
    if patterns.len() > MAX_PATTERNS {
        return Err(ApiError::Invalid(format!(
            "patterns: at most {MAX_PATTERNS} patterns"
        )));
    }
    Ok(patterns)
}

async fn ensure_category_exists(
    state: &AppState,
    user_id: Uuid,
    category_id: Uuid,
) -> Result<(), ApiError> {
    let categories = categories::repo::list(state.store.as_ref(), user_id).await?;
    if !categories.iter().any(|c| c.id == category_id) {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_rules(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<RuleListResponse>, ApiError> {
    let rules = repo::list(state.store.as_ref(), user_id).await?;
    Ok(Json(RuleListResponse {
        success: true,
        rules,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_rule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRuleRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    let patterns = normalize_patterns(payload.patterns)?;
    ensure_category_exists(&state, user_id, payload.category_id).await?;

    let mut rules = repo::list(state.store.as_ref(), user_id).await?;
    // New rules go to the end of the evaluation order
    let priority = rules.iter().map(|r| r.priority).max().map_or(1, |p| p + 1);
    let rule = AutoCategorizeRule {
        id: Uuid::new_v4(),
        priority,
        patterns,
        category_id: payload.category_id,
        description: payload.description.filter(|d| !d.trim().is_empty()),
        is_active: payload.is_active,
    };
    rules.push(rule.clone());
    repo::save_all(state.store.as_ref(), user_id, &rules).await?;

    info!(rule_id = %rule.id, priority, "rule created");
    Ok(Json(RuleResponse {
        success: true,
        rule,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_rule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRuleRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state, user_id, category_id).await?;
    }
    let patterns = payload.patterns.map(normalize_patterns).transpose()?;

    let mut rules = repo::list(state.store.as_ref(), user_id).await?;
    let rule = rules
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(ApiError::NotFound("Rule"))?;

    if let Some(patterns) = patterns {
        rule.patterns = patterns;
    }
    if let Some(category_id) = payload.category_id {
        rule.category_id = category_id;
    }
    if let Some(description) = payload.description {
        rule.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(active) = payload.is_active {
        rule.is_active = active;
    }

    let updated = rule.clone();
    repo::save_all(state.store.as_ref(), user_id, &rules).await?;
    Ok(Json(RuleResponse {
        success: true,
        rule: updated,
    }))
}

#[instrument(skip(state))]
pub async fn delete_rule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut rules = repo::list(state.store.as_ref(), user_id).await?;
    let before = rules.len();
    rules.retain(|r| r.id != id);
    if rules.len() == before {
        return Err(ApiError::NotFound("Rule"));
    }
    repo::save_all(state.store.as_ref(), user_id, &rules).await?;
    info!(rule_id = %id, "rule deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// Reordering is an adjacent-priority swap; moving past either end of the
/// list is a no-op.
#[instrument(skip(state, payload))]
pub async fn move_rule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveRuleRequest>,
) -> Result<Json<RuleListResponse>, ApiError> {
    let up = match payload.direction.as_str() {
        "up" => true,
        "down" => false,
        other => {
            return Err(ApiError::Invalid(format!(
                "direction: {other:?} (expected up or down)"
            )))
        }
    };

    // repo::list returns rules sorted by priority
    let mut rules = repo::list(state.store.as_ref(), user_id).await?;
    let index = rules
        .iter()
        .position(|r| r.id == id)
        .ok_or(ApiError::NotFound("Rule"))?;

    let neighbor = if up {
        index.checked_sub(1)
    } else if index + 1 < rules.len() {
        Some(index + 1)
    } else {
        None
    };
    if let Some(neighbor) = neighbor {
        let tmp = rules[index].priority;
        rules[index].priority = rules[neighbor].priority;
        rules[neighbor].priority = tmp;
        rules.sort_by_key(|r| r.priority);
        repo::save_all(state.store.as_ref(), user_id, &rules).await?;
    }

    Ok(Json(RuleListResponse {
        success: true,
        rules,
    }))
}

#[instrument(skip(state, payload))]
pub async fn preview_rules(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let mode = ApplyMode::parse(payload.mode.as_deref())?;
    let rules = repo::list(state.store.as_ref(), user_id).await?;
    let txns = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let stats = engine::preview(&rules, &txns, mode);
    Ok(Json(RunResponse {
        success: true,
        stats,
    }))
}

#[instrument(skip(state, payload))]
pub async fn apply_rules(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let mode = ApplyMode::parse(payload.mode.as_deref())?;
    let rules = repo::list(state.store.as_ref(), user_id).await?;
    let mut txns = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let stats = engine::apply(&rules, &mut txns, mode);
    transactions::repo::save_all(state.store.as_ref(), user_id, &txns).await?;
    info!(
        newly_categorized = stats.newly_categorized,
        recategorized = stats.recategorized,
        ?mode,
        "rules applied"
    );
    Ok(Json(RunResponse {
        success: true,
        stats,
    }))
}
