pub mod accounts;
pub mod app;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod config;
pub mod crypto;
pub mod dates;
pub mod error;
pub mod plaid;
pub mod reports;
pub mod rules;
pub mod state;
pub mod store;
pub mod transactions;
