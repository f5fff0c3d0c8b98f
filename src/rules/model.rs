use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_PATTERNS: usize = 5;

/// An ordered pattern-to-category mapping. Rules are evaluated in ascending
/// priority; within a rule the patterns are OR-matched as case-insensitive
/// substrings of a transaction's description or merchant name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCategorizeRule {
    pub id: Uuid,
    pub priority: u32,
    pub patterns: Vec<String>,
    pub category_id: Uuid,
    /// When set, a matching transaction's display description is overwritten.
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
