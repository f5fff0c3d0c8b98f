use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CategoryListResponse, CategoryResponse, CreateCategoryRequest, DeleteResponse, ImportRequest,
    ImportResponse, UpdateCategoryRequest,
};
use super::import;
use super::model::Category;
use super::repo;
use crate::auth::services::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transactions;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/import", post(import_categories))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
}

fn find_duplicate(categories: &[Category], name: &str, parent_id: Option<Uuid>) -> bool {
    categories
        .iter()
        .any(|c| c.parent_id == parent_id && c.name.eq_ignore_ascii_case(name))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = repo::list(state.store.as_ref(), user_id).await?;
    Ok(Json(CategoryListResponse {
        success: true,
        categories,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Invalid("name: must not be empty".into()));
    }

    let mut categories = repo::list(state.store.as_ref(), user_id).await?;
    if let Some(parent_id) = payload.parent_id {
        let parent = categories
            .iter()
            .find(|c| c.id == parent_id)
            .ok_or(ApiError::NotFound("Parent category"))?;
        // One level of nesting only
        if parent.parent_id.is_some() {
            return Err(ApiError::Invalid(
                "parentId: nested categories cannot have children".into(),
            ));
        }
    }
    if find_duplicate(&categories, &name, payload.parent_id) {
        return Err(ApiError::Conflict(format!("Category {name:?} already exists")));
    }

    let category = Category {
        id: Uuid::new_v4(),
        name,
        parent_id: payload.parent_id,
        is_hidden: payload.is_hidden,
        is_savings: payload.is_savings,
    };
    categories.push(category.clone());
    repo::save_all(state.store.as_ref(), user_id, &categories).await?;

    info!(category_id = %category.id, "category created");
    Ok(Json(CategoryResponse {
        success: true,
        category,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let mut categories = repo::list(state.store.as_ref(), user_id).await?;
    let category = categories
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(ApiError::NotFound("Category"))?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::Invalid("name: must not be empty".into()));
        }
        category.name = name;
    }
    if let Some(hidden) = payload.is_hidden {
        category.is_hidden = hidden;
    }
    if let Some(savings) = payload.is_savings {
        category.is_savings = savings;
    }

    let updated = category.clone();
    repo::save_all(state.store.as_ref(), user_id, &categories).await?;
    Ok(Json(CategoryResponse {
        success: true,
        category: updated,
    }))
}

/// Deleting a parent cascades to its children; transactions that pointed at
/// any removed category revert to uncategorized.
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let categories = repo::list(state.store.as_ref(), user_id).await?;
    if !categories.iter().any(|c| c.id == id) {
        return Err(ApiError::NotFound("Category"));
    }

    let (removed, kept): (Vec<Category>, Vec<Category>) = categories
        .into_iter()
        .partition(|c| c.id == id || c.parent_id == Some(id));
    repo::save_all(state.store.as_ref(), user_id, &kept).await?;

    let removed_ids: Vec<Uuid> = removed.iter().map(|c| c.id).collect();
    let mut txns = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let mut cleared = false;
    for txn in txns.iter_mut() {
        if let Some(cat) = txn.user_category_id {
            if removed_ids.contains(&cat) {
                txn.user_category_id = None;
                cleared = true;
            }
        }
    }
    if cleared {
        transactions::repo::save_all(state.store.as_ref(), user_id, &txns).await?;
    }

    info!(category_id = %id, deleted = removed.len(), "category deleted");
    Ok(Json(DeleteResponse {
        success: true,
        deleted: removed.len(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn import_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let (rows, errors) = import::parse(&payload.csv)?;

    let mut categories = repo::list(state.store.as_ref(), user_id).await?;
    let mut created = 0usize;
    let mut skipped = 0usize;

    for row in rows {
        // Parents are created on demand, before their children
        let parent_id = match categories
            .iter()
            .find(|c| c.parent_id.is_none() && c.name.eq_ignore_ascii_case(&row.parent))
        {
            Some(parent) => parent.id,
            None => {
                let parent = Category {
                    id: Uuid::new_v4(),
                    name: row.parent.clone(),
                    parent_id: None,
                    is_hidden: false,
                    is_savings: false,
                };
                let id = parent.id;
                categories.push(parent);
                created += 1;
                id
            }
        };

        if find_duplicate(&categories, &row.child, Some(parent_id)) {
            skipped += 1;
            continue;
        }
        categories.push(Category {
            id: Uuid::new_v4(),
            name: row.child,
            parent_id: Some(parent_id),
            is_hidden: row.hidden,
            is_savings: row.savings,
        });
        created += 1;
    }

    repo::save_all(state.store.as_ref(), user_id, &categories).await?;
    info!(created, skipped, row_errors = errors.len(), "categories imported");
    Ok(Json(ImportResponse {
        success: true,
        created,
        skipped,
        errors,
    }))
}
