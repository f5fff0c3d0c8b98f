use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A monthly spending target, unique per (category, month).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    /// `YYYY-MM`.
    pub month: String,
    pub amount: f64,
    /// Carry last month's unspent remainder into this month.
    #[serde(default)]
    pub rollover: bool,
}
