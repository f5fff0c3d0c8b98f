//! "Other" bucketing for category-breakdown charts.
//!
//! A presentation heuristic, not a data-integrity algorithm: the only
//! contracts are that slice values still sum to the parent total and the
//! thresholds below are honored exactly.

use serde::Serialize;
use uuid::Uuid;

/// Cumulative share, in percent, kept as individual slices.
const MAIN_SHARE_THRESHOLD: f64 = 90.0;
/// The remainder collapses into "Other" only above both of these.
const OTHER_MIN_PERCENT: f64 = 1.0;
const OTHER_MIN_VALUE: f64 = 1.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSlice {
    /// `None` for synthetic slices ("Other", "Uncategorized").
    pub category_id: Option<Uuid>,
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

/// Collapses the tail of a descending-ordered breakdown into one "Other"
/// slice. Slices are accumulated until their cumulative percentage reaches
/// 90% or only one slice remains; the remainder is grouped only when it
/// holds more than one category and its combined share exceeds both 1% and
/// $1; otherwise it stays as individual slices.
pub fn bucket_other(mut slices: Vec<BreakdownSlice>) -> Vec<BreakdownSlice> {
    slices.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));

    let mut main = Vec::with_capacity(slices.len());
    let mut rest = Vec::new();
    let mut cumulative = 0.0;
    let mut drain = slices.into_iter().peekable();
    while let Some(slice) = drain.next() {
        if cumulative >= MAIN_SHARE_THRESHOLD && drain.peek().is_some() {
            rest.push(slice);
            rest.extend(drain);
            break;
        }
        cumulative += slice.percentage;
        main.push(slice);
    }

    let rest_value: f64 = rest.iter().map(|s| s.value).sum();
    let rest_percentage: f64 = rest.iter().map(|s| s.percentage).sum();
    if rest.len() > 1 && rest_percentage > OTHER_MIN_PERCENT && rest_value > OTHER_MIN_VALUE {
        main.push(BreakdownSlice {
            category_id: None,
            name: "Other".into(),
            value: rest_value,
            percentage: rest_percentage,
        });
    } else {
        main.extend(rest);
    }
    main
}
