//! Rule evaluation: first match wins.

use serde::{Deserialize, Serialize};

use super::model::AutoCategorizeRule;
use crate::error::ApiError;
use crate::transactions::model::Transaction;

/// Which transactions a run touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Only transactions without a user category.
    Uncategorized,
    /// Force-recategorize everything, overwriting existing assignments.
    All,
}

impl ApplyMode {
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("uncategorized") {
            "uncategorized" => Ok(Self::Uncategorized),
            "all" => Ok(Self::All),
            other => Err(ApiError::Invalid(format!(
                "mode: {other:?} (expected uncategorized or all)"
            ))),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub newly_categorized: usize,
    pub recategorized: usize,
}

fn rule_matches(rule: &AutoCategorizeRule, txn: &Transaction) -> bool {
    let name = txn.name.to_lowercase();
    let merchant = txn.merchant_name.as_deref().map(str::to_lowercase);
    rule.patterns.iter().any(|pattern| {
        let p = pattern.to_lowercase();
        if p.is_empty() {
            return false;
        }
        name.contains(&p) || merchant.as_deref().is_some_and(|m| m.contains(&p))
    })
}

/// Active rules in evaluation order.
fn ordered<'r>(rules: &'r [AutoCategorizeRule]) -> Vec<&'r AutoCategorizeRule> {
    let mut active: Vec<&AutoCategorizeRule> = rules.iter().filter(|r| r.is_active).collect();
    active.sort_by_key(|r| r.priority);
    active
}

fn first_match<'r>(
    ordered: &[&'r AutoCategorizeRule],
    txn: &Transaction,
) -> Option<&'r AutoCategorizeRule> {
    ordered.iter().find(|rule| rule_matches(rule, txn)).copied()
}

/// Runs the rule set over the transactions, mutating matches in place.
pub fn apply(
    rules: &[AutoCategorizeRule],
    transactions: &mut [Transaction],
    mode: ApplyMode,
) -> RunStats {
    let ordered = ordered(rules);
    let mut stats = RunStats::default();

    for txn in transactions.iter_mut() {
        if mode == ApplyMode::Uncategorized && txn.user_category_id.is_some() {
            continue;
        }
        let Some(rule) = first_match(&ordered, txn) else {
            continue;
        };
        match txn.user_category_id {
            None => stats.newly_categorized += 1,
            Some(current) if current != rule.category_id => stats.recategorized += 1,
            Some(_) => {}
        }
        txn.user_category_id = Some(rule.category_id);
        if let Some(description) = &rule.description {
            txn.user_description = Some(description.clone());
        }
    }
    stats
}

/// Same counting as [`apply`] but with no mutation, so a caller can confirm
/// before a destructive recategorization.
pub fn preview(
    rules: &[AutoCategorizeRule],
    transactions: &[Transaction],
    mode: ApplyMode,
) -> RunStats {
    let mut scratch = transactions.to_vec();
    apply(rules, &mut scratch, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use time::macros::date;
    use uuid::Uuid;

    fn txn(name: &str, merchant: Option<&str>, category: Option<Uuid>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            account_id: Uuid::nil(),
            plaid_transaction_id: None,
            amount: 10.0,
            date: date!(2026 - 08 - 01),
            name: name.into(),
            merchant_name: merchant.map(Into::into),
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

    fn rule(priority: u32, patterns: &[&str], category_id: Uuid) -> AutoCategorizeRule {
        AutoCategorizeRule {
            id: Uuid::new_v4(),
            priority,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            category_id,
            description: None,
            is_active: true,
        }
    }

    #[test]
    fn first_match_by_priority_wins() {
        let cat_a = Uuid::new_v4();
        let cat_b = Uuid::new_v4();
        let rules = vec![rule(2, &["coffee"], cat_b), rule(1, &["coffee"], cat_a)];
        let mut txns = vec![txn("BLUE BOTTLE COFFEE", None, None)];
        let stats = apply(&rules, &mut txns, ApplyMode::Uncategorized);
        assert_eq!(stats.newly_categorized, 1);
        assert_eq!(txns[0].user_category_id, Some(cat_a));
    }

    #[test]
    fn patterns_are_or_matched_case_insensitively() {
        let cat = Uuid::new_v4();
        let rules = vec![rule(1, &["netflix", "HULU"], cat)];
        let mut txns = vec![
            txn("NETFLIX.COM", None, None),
            txn("Payment", Some("hulu"), None),
            txn("SPOTIFY", None, None),
        ];
        let stats = apply(&rules, &mut txns, ApplyMode::Uncategorized);
        assert_eq!(stats.newly_categorized, 2);
        assert_eq!(txns[2].user_category_id, None);
    }

    #[test]
    fn inactive_rules_do_not_participate() {
        let cat = Uuid::new_v4();
        let mut inactive = rule(1, &["coffee"], cat);
        inactive.is_active = false;
        let mut txns = vec![txn("COFFEE SHOP", None, None)];
        let stats = apply(&[inactive], &mut txns, ApplyMode::Uncategorized);
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn uncategorized_mode_leaves_existing_assignments() {
        let cat_old = Uuid::new_v4();
        let cat_new = Uuid::new_v4();
        let rules = vec![rule(1, &["coffee"], cat_new)];
        let mut txns = vec![txn("COFFEE SHOP", None, Some(cat_old))];
        let stats = apply(&rules, &mut txns, ApplyMode::Uncategorized);
        assert_eq!(stats, RunStats::default());
        assert_eq!(txns[0].user_category_id, Some(cat_old));
    }

    #[test]
    fn all_mode_overwrites_and_counts_recategorized() {
        let cat_old = Uuid::new_v4();
        let cat_new = Uuid::new_v4();
        let rules = vec![rule(1, &["coffee"], cat_new)];
        let mut txns = vec![
            txn("COFFEE SHOP", None, Some(cat_old)),
            txn("COFFEE CART", None, None),
        ];
        let stats = apply(&rules, &mut txns, ApplyMode::All);
        assert_eq!(stats.recategorized, 1);
        assert_eq!(stats.newly_categorized, 1);
        assert_eq!(txns[0].user_category_id, Some(cat_new));
    }

    #[test]
    fn preview_counts_without_mutating() {
        let cat = Uuid::new_v4();
        let rules = vec![rule(1, &["coffee"], cat)];
        let txns = vec![txn("COFFEE SHOP", None, None)];
        let stats = preview(&rules, &txns, ApplyMode::Uncategorized);
        assert_eq!(stats.newly_categorized, 1);
        assert_eq!(txns[0].user_category_id, None);
    }

    #[test]
    fn description_override_writes_user_description() {
        let cat = Uuid::new_v4();
        let mut r = rule(1, &["oakwood"], cat);
        r.description = Some("Rent".into());
        let mut txns = vec![txn("OAKWOOD PROPERTY MGMT RENT", None, None)];
        apply(&[r], &mut txns, ApplyMode::Uncategorized);
        assert_eq!(txns[0].user_description.as_deref(), Some("Rent"));
        // The searchable name is untouched
        assert_eq!(txns[0].name, "OAKWOOD PROPERTY MGMT RENT");
    }

    #[test]
    fn invalid_mode_is_rejected() {
        assert!(ApplyMode::parse(Some("everything")).is_err());
        assert_eq!(ApplyMode::parse(None).unwrap(), ApplyMode::Uncategorized);
    }
}
