use std::collections::HashMap;

use serde::Serialize;
use time::Date;
use uuid::Uuid;

use super::bucketing::{bucket_other, BreakdownSlice};
use super::model::ActualsOverride;
use crate::categories::model::Category;
use crate::dates::{month_of, next_month, trailing_months};
use crate::error::ApiError;
use crate::transactions::model::Transaction;

/// Rows that count toward reports: visible, settled ones.
fn reportable(t: &Transaction) -> bool {
    !t.is_hidden && !t.pending
}

/// Spending by category over a date range, with the tail collapsed into
/// "Other". At the top level child spend rolls up into its parent; passing
/// `parent_id` drills one level down into that parent's children, with the
/// parent's own direct transactions shown under the parent's name.
pub fn spending_breakdown(
    categories: &[Category],
    transactions: &[Transaction],
    start: Date,
    end: Date,
    parent_id: Option<Uuid>,
) -> Result<Vec<BreakdownSlice>, ApiError> {
    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    if let Some(parent_id) = parent_id {
        match by_id.get(&parent_id) {
            None => return Err(ApiError::NotFound("Category")),
            Some(parent) if parent.parent_id.is_some() => {
                return Err(ApiError::Invalid("parentId: not a top-level category".into()))
            }
            Some(_) => {}
        }
    }

    // (slice key, display name) per expense row; None key = synthetic slice
    let mut totals: HashMap<Option<Uuid>, (String, f64)> = HashMap::new();
    for t in transactions {
        if !reportable(t) || t.is_income() || t.date < start || t.date > end {
            continue;
        }
        let entry = match parent_id {
            None => match t.user_category_id.and_then(|id| by_id.get(&id)) {
                Some(cat) => {
                    let top = cat
                        .parent_id
                        .and_then(|pid| by_id.get(&pid))
                        .copied()
                        .unwrap_or(cat);
                    Some((Some(top.id), top.name.clone()))
                }
                None => Some((None, "Uncategorized".to_string())),
            },
            Some(parent_id) => match t.user_category_id.and_then(|id| by_id.get(&id)) {
                Some(cat) if cat.id == parent_id || cat.parent_id == Some(parent_id) => {
                    Some((Some(cat.id), cat.name.clone()))
                }
                _ => None,
            },
        };
        if let Some((key, name)) = entry {
            let slot = totals.entry(key).or_insert_with(|| (name, 0.0));
            slot.1 += t.amount;
        }
    }

    let grand_total: f64 = totals.values().map(|(_, v)| v).sum();
    if grand_total <= 0.0 {
        return Ok(Vec::new());
    }

    let slices: Vec<BreakdownSlice> = totals
        .into_iter()
        .map(|(key, (name, value))| BreakdownSlice {
            category_id: key,
            name,
            value,
            percentage: value / grand_total * 100.0,
        })
        .collect();
    Ok(bucket_other(slices))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthCashflow {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    /// True when an actuals override replaced the computed totals.
    pub overridden: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowProjection {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Month-by-month income/expense totals for the trailing `months` months,
/// with manual overrides applied, plus a next-month projection from the
/// trailing average.
pub fn cashflow(
    transactions: &[Transaction],
    overrides: &[ActualsOverride],
    today: Date,
    months: usize,
) -> (Vec<MonthCashflow>, Option<CashflowProjection>) {
    let keys = trailing_months(today, months);
    let mut rows = Vec::with_capacity(keys.len());
    for key in &keys {
        let row = match overrides.iter().find(|o| &o.month == key) {
            Some(o) => MonthCashflow {
                month: key.clone(),
                income: o.total_income,
                expenses: o.total_expenses,
                net: o.total_income - o.total_expenses,
                overridden: true,
            },
            None => {
                let mut income = 0.0;
                let mut expenses = 0.0;
                for t in transactions {
                    if !reportable(t) || &month_of(t.date) != key {
                        continue;
                    }
                    if t.is_income() {
                        income += -t.amount;
                    } else {
                        expenses += t.amount;
                    }
                }
                MonthCashflow {
                    month: key.clone(),
                    income,
                    expenses,
                    net: income - expenses,
                    overridden: false,
                }
            }
        };
        rows.push(row);
    }

    let projection = (!rows.is_empty()).then(|| {
        let n = rows.len() as f64;
        let income = rows.iter().map(|r| r.income).sum::<f64>() / n;
        let expenses = rows.iter().map(|r| r.expenses).sum::<f64>() / n;
        CashflowProjection {
            month: next_month(&month_of(today)).unwrap_or_default(),
            income,
            expenses,
            net: income - expenses,
        }
    });

    (rows, projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use time::macros::date;

    fn txn(amount: f64, date: Date, category: Option<Uuid>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            account_id: Uuid::nil(),
            plaid_transaction_id: None,
            amount,
            date,
            name: "ROW".into(),
            merchant_name: None,
            user_description: None,
            category: Vec::new(),
            user_category_id: category,
            tags: BTreeSet::new(),
            notes: None,
            is_hidden: false,
            pending: false,
            is_split: false,
            parent_transaction_id: None,
        }
    }

    fn cat(name: &str, parent: Option<Uuid>) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            parent_id: parent,
            is_hidden: false,
            is_savings: false,
        }
    }

    #[test]
    fn child_spend_rolls_up_to_parent_at_top_level() {
        let food = cat("Food", None);
        let groceries = cat("Groceries", Some(food.id));
        let restaurants = cat("Restaurants", Some(food.id));
        let categories = vec![food.clone(), groceries.clone(), restaurants.clone()];
        let txns = vec![
            txn(100.0, date!(2026 - 08 - 02), Some(groceries.id)),
            txn(50.0, date!(2026 - 08 - 03), Some(restaurants.id)),
        ];
        let out = spending_breakdown(
            &categories,
            &txns,
            date!(2026 - 08 - 01),
            date!(2026 - 08 - 31),
            None,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category_id, Some(food.id));
        assert_eq!(out[0].value, 150.0);
        assert!((out[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn drilldown_splits_children_and_direct_spend() {
        let food = cat("Food", None);
        let groceries = cat("Groceries", Some(food.id));
        let categories = vec![food.clone(), groceries.clone()];
        let txns = vec![
            txn(100.0, date!(2026 - 08 - 02), Some(groceries.id)),
            txn(40.0, date!(2026 - 08 - 03), Some(food.id)),
            txn(999.0, date!(2026 - 08 - 04), None), // outside the parent
        ];
        let out = spending_breakdown(
            &categories,
            &txns,
            date!(2026 - 08 - 01),
            date!(2026 - 08 - 31),
            Some(food.id),
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        let total: f64 = out.iter().map(|s| s.value).sum();
        assert_eq!(total, 140.0);
    }

    #[test]
    fn uncategorized_and_income_handling() {
        let categories = Vec::new();
        let txns = vec![
            txn(60.0, date!(2026 - 08 - 02), None),
            txn(-500.0, date!(2026 - 08 - 03), None), // income, excluded
        ];
        let out = spending_breakdown(
            &categories,
            &txns,
            date!(2026 - 08 - 01),
            date!(2026 - 08 - 31),
            None,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Uncategorized");
        assert_eq!(out[0].value, 60.0);
    }

    #[test]
    fn unknown_parent_is_not_found() {
        assert!(spending_breakdown(
            &[],
            &[],
            date!(2026 - 08 - 01),
            date!(2026 - 08 - 31),
            Some(Uuid::new_v4()),
        )
        .is_err());
    }

    #[test]
    fn cashflow_applies_overrides_and_projects() {
        let txns = vec![
            txn(-1000.0, date!(2026 - 07 - 05), None),
            txn(400.0, date!(2026 - 07 - 10), None),
            txn(-1000.0, date!(2026 - 08 - 05), None),
            txn(600.0, date!(2026 - 08 - 10), None),
        ];
        let overrides = vec![ActualsOverride {
            month: "2026-07".into(),
            total_income: 2000.0,
            total_expenses: 500.0,
        }];
        let (rows, projection) = cashflow(&txns, &overrides, date!(2026 - 08 - 20), 2);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].overridden);
        assert_eq!(rows[0].income, 2000.0);
        assert_eq!(rows[0].net, 1500.0);
        assert!(!rows[1].overridden);
        assert_eq!(rows[1].income, 1000.0);
        assert_eq!(rows[1].expenses, 600.0);

        let projection = projection.unwrap();
        assert_eq!(projection.month, "2026-09");
        assert_eq!(projection.income, 1500.0);
        assert_eq!(projection.expenses, 550.0);
    }

    #[test]
    fn cashflow_skips_hidden_and_pending() {
        let mut hidden = txn(100.0, date!(2026 - 08 - 05), None);
        hidden.is_hidden = true;
        let mut pending = txn(100.0, date!(2026 - 08 - 06), None);
        pending.pending = true;
        let (rows, _) = cashflow(&[hidden, pending], &[], date!(2026 - 08 - 20), 1);
        assert_eq!(rows[0].expenses, 0.0);
    }
}
