use uuid::Uuid;

use super::model::Budget;
use crate::dates::{month_of, previous_month};
use crate::transactions::model::Transaction;

/// Spend against a category in a month: visible, settled expense rows only.
pub fn spent_in_month(transactions: &[Transaction], category_id: Uuid, month: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| !t.is_hidden && !t.pending && !t.is_income())
        .filter(|t| t.user_category_id == Some(category_id))
        .filter(|t| month_of(t.date) == month)
        .map(|t| t.amount)
        .sum()
}

/// Budgeted amount for the month, with last month's unspent remainder added
/// when rollover is on. Overspend never rolls forward as a deficit.
pub fn effective_amount(budget: &Budget, budgets: &[Budget], transactions: &[Transaction]) -> f64 {
    if !budget.rollover {
        return budget.amount;
    }
    let Some(prev_month) = previous_month(&budget.month) else {
        return budget.amount;
    };
    let Some(prev) = budgets
        .iter()
        .find(|b| b.category_id == budget.category_id && b.month == prev_month)
    else {
        return budget.amount;
    };
    let leftover = prev.amount - spent_in_month(transactions, prev.category_id, &prev_month);
    budget.amount + leftover.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use time::macros::date;

    fn expense(category_id: Uuid, amount: f64, date: time::Date) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            account_id: Uuid::nil(),
            plaid_transaction_id: None,
            amount,
            date,
            name: "EXPENSE".into(),
            merchant_name: None,
            user_description: None,
            category: Vec::new(),
            user_category_id: Some(category_id),
            tags: BTreeSet::new(),
            notes: None,
            is_hidden: false,
            pending: false,
            is_split: false,
            parent_transaction_id: None,
        }
    }

    fn budget(category_id: Uuid, month: &str, amount: f64, rollover: bool) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            category_id,
            month: month.into(),
            amount,
            rollover,
        }
    }

    #[test]
    fn spent_ignores_hidden_pending_and_income() {
        let cat = Uuid::new_v4();
        let mut hidden = expense(cat, 40.0, date!(2026 - 08 - 02));
        hidden.is_hidden = true;
        let mut pending = expense(cat, 30.0, date!(2026 - 08 - 03));
        pending.pending = true;
        let txns = vec![
            expense(cat, 25.0, date!(2026 - 08 - 01)),
            expense(cat, -100.0, date!(2026 - 08 - 04)), // refund/credit
            hidden,
            pending,
        ];
        assert_eq!(spent_in_month(&txns, cat, "2026-08"), 25.0);
    }

    #[test]
    fn rollover_adds_previous_leftover() {
        let cat = Uuid::new_v4();
        let budgets = vec![
            budget(cat, "2026-07", 100.0, true),
            budget(cat, "2026-08", 100.0, true),
        ];
        let txns = vec![expense(cat, 60.0, date!(2026 - 07 - 15))];
        assert_eq!(effective_amount(&budgets[1], &budgets, &txns), 140.0);
    }

    #[test]
    fn overspend_does_not_roll_forward() {
        let cat = Uuid::new_v4();
        let budgets = vec![
            budget(cat, "2026-07", 100.0, true),
            budget(cat, "2026-08", 100.0, true),
        ];
        let txns = vec![expense(cat, 180.0, date!(2026 - 07 - 15))];
        assert_eq!(effective_amount(&budgets[1], &budgets, &txns), 100.0);
    }

    #[test]
    fn no_rollover_is_just_the_amount() {
        let cat = Uuid::new_v4();
        let budgets = vec![
            budget(cat, "2026-07", 100.0, false),
            budget(cat, "2026-08", 100.0, false),
        ];
        assert_eq!(effective_amount(&budgets[1], &budgets, &[]), 100.0);
    }
}
