//! Query-driven filtering over a user's transaction list.
//!
//! Semantics: AND across filter dimensions, OR within the `tags` and
//! `categoryIds` lists. `unfilteredTotal` is counted after the date/account
//! filters only, so the UI can show "N of M in range".

use std::collections::HashSet;

use time::Date;
use uuid::Uuid;

use super::dto::TransactionQuery;
use super::model::Transaction;
use crate::dates::parse_date;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
    All,
}

impl TransactionType {
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("all") {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "all" => Ok(Self::All),
            other => Err(ApiError::Invalid(format!(
                "transactionType: {other:?} (expected income, expense or all)"
            ))),
        }
    }

    fn matches(self, t: &Transaction) -> bool {
        match self {
            // Sign convention is Plaid's: negative = income, and exactly
            // zero counts as an expense.
            Self::Income => t.is_income(),
            Self::Expense => !t.is_income(),
            Self::All => true,
        }
    }
}

#[derive(Debug)]
pub struct TransactionFilter {
    transaction_type: TransactionType,
    start_date: Option<Date>,
    end_date: Option<Date>,
    account_ids: Option<HashSet<Uuid>>,
    category_ids: Option<HashSet<Uuid>>,
    only_uncategorized: bool,
    tags: Option<Vec<String>>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    include_hidden: bool,
    include_pending: bool,
    search: Option<String>,
}

fn parse_date_param(raw: &Option<String>, param: &str) -> Result<Option<Date>, ApiError> {
    match raw.as_deref().filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| ApiError::Invalid(format!("{param}: expected YYYY-MM-DD"))),
    }
}

fn parse_id_list(raw: &Option<String>, param: &str) -> Result<Option<HashSet<Uuid>>, ApiError> {
    let Some(raw) = raw.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|part| {
            Uuid::parse_str(part.trim())
                .map_err(|_| ApiError::Invalid(format!("{param}: {part:?} is not a UUID")))
        })
        .collect::<Result<HashSet<_>, _>>()
        .map(Some)
}

impl TransactionFilter {
    pub fn from_query(q: &TransactionQuery) -> Result<Self, ApiError> {
        let transaction_type = TransactionType::parse(q.transaction_type.as_deref())?;
        let tags = q.tags.as_deref().filter(|s| !s.is_empty()).map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        });
        Ok(Self {
            transaction_type,
            start_date: parse_date_param(&q.start_date, "startDate")?,
            end_date: parse_date_param(&q.end_date, "endDate")?,
            account_ids: parse_id_list(&q.account_ids, "accountIds")?,
            category_ids: parse_id_list(&q.category_ids, "categoryIds")?,
            only_uncategorized: q.only_uncategorized.unwrap_or(false),
            tags,
            min_amount: q.min_amount,
            max_amount: q.max_amount,
            include_hidden: q.include_hidden.unwrap_or(false),
            include_pending: q.include_pending.unwrap_or(false),
            search: q
                .search_query
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase()),
        })
    }

    fn in_range(&self, t: &Transaction) -> bool {
        if let Some(start) = self.start_date {
            if t.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if t.date > end {
                return false;
            }
        }
        if let Some(accounts) = &self.account_ids {
            if !accounts.contains(&t.account_id) {
                return false;
            }
        }
        true
    }

    fn matches_rest(&self, t: &Transaction) -> bool {
        if t.is_hidden && !self.include_hidden {
            return false;
        }
        if t.pending && !self.include_pending {
            return false;
        }
        if !self.transaction_type.matches(t) {
            return false;
        }
        if self.only_uncategorized && t.user_category_id.is_some() {
            return false;
        }
        if let Some(categories) = &self.category_ids {
            match t.user_category_id {
                Some(id) if categories.contains(&id) => {}
                _ => return false,
            }
        }
        if let Some(tags) = &self.tags {
            let has_any = tags
                .iter()
                .any(|wanted| t.tags.iter().any(|have| have.to_lowercase() == *wanted));
            if !has_any {
                return false;
            }
        }
        let magnitude = t.amount.abs();
        if let Some(min) = self.min_amount {
            if magnitude < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if magnitude > max {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            if !matches_search(t, needle) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring over name, merchant name, tags and notes.
/// `user_description` is intentionally excluded from the search index.
fn matches_search(t: &Transaction, needle: &str) -> bool {
    if t.name.to_lowercase().contains(needle) {
        return true;
    }
    if let Some(merchant) = &t.merchant_name {
        if merchant.to_lowercase().contains(needle) {
            return true;
        }
    }
    if t.tags.iter().any(|tag| tag.to_lowercase().contains(needle)) {
        return true;
    }
    if let Some(notes) = &t.notes {
        if notes.to_lowercase().contains(needle) {
            return true;
        }
    }
    false
}

#[derive(Debug)]
pub struct FilterOutcome {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
    pub unfiltered_total: usize,
}

pub fn run(filter: &TransactionFilter, transactions: Vec<Transaction>) -> FilterOutcome {
    let in_range: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| filter.in_range(t))
        .collect();
    let unfiltered_total = in_range.len();

    let mut matched: Vec<Transaction> = in_range
        .into_iter()
        .filter(|t| filter.matches_rest(t))
        .collect();
    matched.sort_by(|a, b| b.date.cmp(&a.date));

    FilterOutcome {
        total_count: matched.len(),
        unfiltered_total,
        transactions: matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use time::macros::date;

    fn txn(amount: f64, day: u8) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            account_id: Uuid::nil(),
            plaid_transaction_id: None,
            amount,
            date: Date::from_calendar_date(2026, time::Month::August, day).unwrap(),
            name: format!("TXN {amount}"),
            merchant_name: None,
            user_description: None,
            category: Vec::new(),
            user_category_id: None,
            tags: BTreeSet::new(),
            notes: None,
            is_hidden: false,
            pending: false,
            is_split: false,
            parent_transaction_id: None,
        }
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            txn(-2500.0, 1),
            txn(-150.0, 2),
            txn(-75.0, 3),
            txn(150.0, 4),
            txn(65.50, 5),
            txn(1200.0, 6),
        ]
    }

    fn filter(q: TransactionQuery) -> TransactionFilter {
        TransactionFilter::from_query(&q).unwrap()
    }

    #[test]
    fn income_is_exactly_the_negative_amounts() {
        let f = filter(TransactionQuery {
            transaction_type: Some("income".into()),
            ..Default::default()
        });
        let out = run(&f, scenario());
        assert_eq!(out.total_count, 3);
        assert!(out.transactions.iter().all(|t| t.amount < 0.0));
    }

    #[test]
    fn expense_includes_zero_amounts() {
        let mut txns = scenario();
        txns.push(txn(0.0, 7));
        let f = filter(TransactionQuery {
            transaction_type: Some("expense".into()),
            ..Default::default()
        });
        let out = run(&f, txns);
        assert_eq!(out.total_count, 4);
        assert!(out.transactions.iter().all(|t| t.amount >= 0.0));
    }

    #[test]
    fn invalid_transaction_type_is_rejected() {
        let err = TransactionFilter::from_query(&TransactionQuery {
            transaction_type: Some("invalid".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("Invalid"));
    }

    #[test]
    fn min_amount_compares_magnitude() {
        let f = filter(TransactionQuery {
            transaction_type: Some("income".into()),
            min_amount: Some(100.0),
            ..Default::default()
        });
        let out = run(&f, scenario());
        // Excludes the $75 income row
        assert_eq!(out.total_count, 2);
        assert!(out.transactions.iter().all(|t| t.amount.abs() >= 100.0));
    }

    #[test]
    fn filters_intersect_across_dimensions() {
        let f = filter(TransactionQuery {
            transaction_type: Some("expense".into()),
            start_date: Some("2026-08-05".into()),
            end_date: Some("2026-08-31".into()),
            ..Default::default()
        });
        let out = run(&f, scenario());
        // Only 65.50 (the 5th) and 1200 (the 6th) are expenses in range
        assert_eq!(out.total_count, 2);
        assert_eq!(out.unfiltered_total, 2);
    }

    #[test]
    fn unfiltered_total_reflects_date_and_account_filters_only() {
        let mut txns = scenario();
        txns[3].is_hidden = true;
        let f = filter(TransactionQuery {
            transaction_type: Some("income".into()),
            ..Default::default()
        });
        let out = run(&f, txns);
        assert_eq!(out.unfiltered_total, 6);
        assert_eq!(out.total_count, 3);
        assert!(out.unfiltered_total >= out.total_count);
    }

    #[test]
    fn hidden_and_pending_are_excluded_by_default() {
        let mut txns = scenario();
        txns[0].is_hidden = true;
        txns[1].pending = true;
        let out = run(&filter(TransactionQuery::default()), txns.clone());
        assert_eq!(out.total_count, 4);

        let out = run(
            &filter(TransactionQuery {
                include_hidden: Some(true),
                include_pending: Some(true),
                ..Default::default()
            }),
            txns,
        );
        assert_eq!(out.total_count, 6);
    }

    #[test]
    fn results_are_sorted_by_date_descending() {
        let out = run(&filter(TransactionQuery::default()), scenario());
        let dates: Vec<Date> = out.transactions.iter().map(|t| t.date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(dates[0], date!(2026 - 08 - 06));
    }

    #[test]
    fn search_covers_name_merchant_tags_notes() {
        let mut txns = scenario();
        txns[0].name = "ACME PAYROLL".into();
        txns[1].merchant_name = Some("Acme Coffee".into());
        txns[2].tags = BTreeSet::from(["acme-club".to_string()]);
        txns[3].notes = Some("paid back by acme".into());
        let f = filter(TransactionQuery {
            search_query: Some("ACME".into()),
            ..Default::default()
        });
        let out = run(&f, txns);
        assert_eq!(out.total_count, 4);
    }

    #[test]
    fn search_does_not_match_user_description() {
        let mut txns = scenario();
        txns[0].user_description = Some("zebra savings transfer".into());
        let f = filter(TransactionQuery {
            search_query: Some("zebra".into()),
            ..Default::default()
        });
        let out = run(&f, txns);
        assert_eq!(out.total_count, 0);
    }

    #[test]
    fn tags_and_categories_are_or_within_the_list() {
        let cat_a = Uuid::new_v4();
        let cat_b = Uuid::new_v4();
        let mut txns = scenario();
        txns[0].user_category_id = Some(cat_a);
        txns[1].user_category_id = Some(cat_b);
        txns[2].tags = BTreeSet::from(["travel".to_string()]);
        txns[3].tags = BTreeSet::from(["food".to_string()]);

        let f = filter(TransactionQuery {
            category_ids: Some(format!("{cat_a},{cat_b}")),
            ..Default::default()
        });
        assert_eq!(run(&f, txns.clone()).total_count, 2);

        let f = filter(TransactionQuery {
            tags: Some("travel,food".into()),
            ..Default::default()
        });
        assert_eq!(run(&f, txns).total_count, 2);
    }

    #[test]
    fn only_uncategorized_excludes_categorized_rows() {
        let mut txns = scenario();
        txns[0].user_category_id = Some(Uuid::new_v4());
        let f = filter(TransactionQuery {
            only_uncategorized: Some(true),
            ..Default::default()
        });
        assert_eq!(run(&f, txns).total_count, 5);
    }
}
