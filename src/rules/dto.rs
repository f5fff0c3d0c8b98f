use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engine::RunStats;
use super::model::AutoCategorizeRule;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    pub patterns: Vec<String>,
    pub category_id: Uuid,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    pub patterns: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
    /// An empty string clears the override.
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRuleRequest {
    pub direction: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RunRequest {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub success: bool,
    pub rules: Vec<AutoCategorizeRule>,
}

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub success: bool,
    pub rule: AutoCategorizeRule,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: RunStats,
}
