use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A spending category. Nesting is one level deep: a category either has no
/// parent or its parent is itself top-level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_savings: bool,
}
