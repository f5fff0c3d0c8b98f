use std::collections::{HashMap, HashSet};

use tracing::info;
use uuid::Uuid;

use super::repo;
use crate::crypto;
use crate::error::ApiError;
use crate::rules;
use crate::rules::engine::ApplyMode;
use crate::state::AppState;
use crate::transactions::{self, model::Transaction};

#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub added: usize,
    pub newly_categorized: usize,
}

/// Pulls new transactions for every linked item, dedupes on the Plaid
/// transaction id, auto-categorizes the new rows and advances the cursors.
pub async fn sync_user(state: &AppState, user_id: Uuid) -> Result<SyncOutcome, ApiError> {
    let mut accounts = repo::list(state.store.as_ref(), user_id).await?;
    if accounts.is_empty() {
        return Ok(SyncOutcome::default());
    }

    let account_ids: HashMap<String, Uuid> = accounts
        .iter()
        .map(|a| (a.plaid_account_id.clone(), a.id))
        .collect();

    let existing = transactions::repo::list(state.store.as_ref(), user_id).await?;
    let known_plaid_ids: HashSet<&str> = existing
        .iter()
        .filter_map(|t| t.plaid_transaction_id.as_deref())
        .collect();

    let item_ids: Vec<String> = {
        let mut seen = HashSet::new();
        accounts
            .iter()
            .filter(|a| seen.insert(a.plaid_item_id.clone()))
            .map(|a| a.plaid_item_id.clone())
            .collect()
    };

    let mut new_rows: Vec<Transaction> = Vec::new();
    for item_id in item_ids {
        let Some(account) = accounts.iter().find(|a| a.plaid_item_id == item_id) else {
            continue;
        };
        let token = crypto::decrypt(&account.encrypted_access_token, &state.config.token_password)
            .map_err(anyhow::Error::from)?;
        let cursor = account.sync_cursor.clone();

        let page = state
            .plaid
            .transactions_sync(&token, cursor.as_deref())
            .await?;
        for row in page.added {
            if known_plaid_ids.contains(row.plaid_transaction_id.as_str()) {
                continue;
            }
            let Some(&account_id) = account_ids.get(&row.plaid_account_id) else {
                continue;
            };
            new_rows.push(Transaction {
                id: Uuid::new_v4(),
                user_id,
                account_id,
                plaid_transaction_id: Some(row.plaid_transaction_id),
                amount: row.amount,
                date: row.date,
                name: row.name,
                merchant_name: row.merchant_name,
                user_description: None,
                category: row.category,
                user_category_id: None,
                tags: Default::default(),
                notes: None,
                is_hidden: false,
                pending: row.pending,
                is_split: false,
                parent_transaction_id: None,
            });
        }
        for account in accounts.iter_mut().filter(|a| a.plaid_item_id == item_id) {
            account.sync_cursor = Some(page.next_cursor.clone());
        }
    }

    let rule_set = rules::repo::list(state.store.as_ref(), user_id).await?;
    let stats = rules::engine::apply(&rule_set, &mut new_rows, ApplyMode::Uncategorized);

    let outcome = SyncOutcome {
        added: new_rows.len(),
        newly_categorized: stats.newly_categorized,
    };
    transactions::repo::append(state.store.as_ref(), user_id, new_rows).await?;
    repo::save_all(state.store.as_ref(), user_id, &accounts).await?;

    info!(
        user_id = %user_id,
        added = outcome.added,
        newly_categorized = outcome.newly_categorized,
        "plaid sync complete"
    );
    Ok(outcome)
}
