use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::import::RowError;
use super::model::Category;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_savings: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub is_hidden: Option<bool>,
    pub is_savings: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub success: bool,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: usize,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}
