use serde::{Deserialize, Serialize};

/// Manually entered monthly totals that supersede computed aggregates in
/// cash-flow reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualsOverride {
    /// `YYYY-MM`.
    pub month: String,
    pub total_income: f64,
    pub total_expenses: f64,
}
