//! Bank-data aggregation client.
//!
//! Amounts follow the Plaid sign convention throughout the app: positive is
//! a debit (expense), negative is a credit (income). The real network client
//! is out of scope; [`SandboxPlaid`] serves deterministic fixture data so the
//! link/exchange/sync flow works end to end.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::macros::date;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaidAccount {
    pub plaid_account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub mask: Option<String>,
    pub current_balance: f64,
}

#[derive(Debug, Clone)]
pub struct PlaidTransaction {
    pub plaid_transaction_id: String,
    pub plaid_account_id: String,
    pub amount: f64,
    pub date: Date,
    pub name: String,
    pub merchant_name: Option<String>,
    pub category: Vec<String>,
    pub pending: bool,
}

#[derive(Debug, Clone)]
pub struct ExchangedToken {
    pub access_token: String,
    pub item_id: String,
}

#[derive(Debug, Clone)]
pub struct TransactionsPage {
    pub added: Vec<PlaidTransaction>,
    pub next_cursor: String,
}

#[async_trait]
pub trait PlaidApi: Send + Sync {
    async fn create_link_token(&self, user_id: Uuid) -> anyhow::Result<String>;
    async fn exchange_public_token(&self, public_token: &str) -> anyhow::Result<ExchangedToken>;
    async fn accounts(&self, access_token: &str) -> anyhow::Result<Vec<PlaidAccount>>;
    /// Incremental fetch; pass the cursor from the previous page to resume.
    async fn transactions_sync(
        &self,
        access_token: &str,
        cursor: Option<&str>,
    ) -> anyhow::Result<TransactionsPage>;
}

const SANDBOX_CURSOR: &str = "sandbox-cursor-1";

#[derive(Default)]
pub struct SandboxPlaid;

impl SandboxPlaid {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlaidApi for SandboxPlaid {
    async fn create_link_token(&self, user_id: Uuid) -> anyhow::Result<String> {
        Ok(format!("link-sandbox-{user_id}"))
    }

    async fn exchange_public_token(&self, public_token: &str) -> anyhow::Result<ExchangedToken> {
        if public_token.is_empty() {
            anyhow::bail!("empty public token");
        }
        let suffix: u64 = rand::thread_rng().gen();
        Ok(ExchangedToken {
            access_token: format!("access-sandbox-{suffix:016x}"),
            item_id: format!("item-sandbox-{suffix:08x}"),
        })
    }

    async fn accounts(&self, _access_token: &str) -> anyhow::Result<Vec<PlaidAccount>> {
        Ok(vec![
            PlaidAccount {
                plaid_account_id: "sandbox-checking".into(),
                name: "Plaid Checking".into(),
                official_name: Some("Plaid Gold Standard 0% Interest Checking".into()),
                account_type: "depository".into(),
                mask: Some("0000".into()),
                current_balance: 4210.57,
            },
            PlaidAccount {
                plaid_account_id: "sandbox-credit".into(),
                name: "Plaid Credit Card".into(),
                official_name: Some("Plaid Diamond 12.5% APR Interest Credit Card".into()),
                account_type: "credit".into(),
                mask: Some("3333".into()),
                current_balance: -410.22,
            },
        ])
    }

    async fn transactions_sync(
        &self,
        _access_token: &str,
        cursor: Option<&str>,
    ) -> anyhow::Result<TransactionsPage> {
        // One fixed batch; once the caller holds the cursor there is nothing new.
        if cursor.is_some() {
            return Ok(TransactionsPage {
                added: Vec::new(),
                next_cursor: SANDBOX_CURSOR.into(),
            });
        }
        let added = vec![
            fixture("sb-txn-01", "sandbox-checking", -2500.00, date!(2026 - 08 - 01),
                "ACME CORP PAYROLL", None, &["Transfer", "Payroll"], false),
            fixture("sb-txn-02", "sandbox-checking", -150.00, date!(2026 - 08 - 05),
                "VENMO CASHOUT", Some("Venmo"), &["Transfer"], false),
            fixture("sb-txn-03", "sandbox-checking", -75.00, date!(2026 - 08 - 12),
                "INTEREST PAYMENT", None, &["Interest"], false),
            fixture("sb-txn-04", "sandbox-credit", 150.00, date!(2026 - 08 - 07),
                "WHOLE FOODS MARKET", Some("Whole Foods"), &["Food and Drink", "Groceries"], false),
            fixture("sb-txn-05", "sandbox-credit", 65.50, date!(2026 - 08 - 14),
                "SHELL OIL 5741", Some("Shell"), &["Travel", "Gas Stations"], false),
            fixture("sb-txn-06", "sandbox-checking", 1200.00, date!(2026 - 08 - 15),
                "OAKWOOD PROPERTY MGMT RENT", None, &["Payment", "Rent"], false),
            fixture("sb-txn-07", "sandbox-credit", 12.99, date!(2026 - 08 - 16),
                "NETFLIX.COM", Some("Netflix"), &["Service", "Subscription"], true),
        ];
        Ok(TransactionsPage {
            added,
            next_cursor: SANDBOX_CURSOR.into(),
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    id: &str,
    account: &str,
    amount: f64,
    date: Date,
    name: &str,
    merchant: Option<&str>,
    category: &[&str],
    pending: bool,
) -> PlaidTransaction {
    PlaidTransaction {
        plaid_transaction_id: id.into(),
        plaid_account_id: account.into(),
        amount,
        date,
        name: name.into(),
        merchant_name: merchant.map(Into::into),
        category: category.iter().map(|c| c.to_string()).collect(),
        pending,
    }
}
