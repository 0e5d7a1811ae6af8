//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Aggregation helpers used by the dashboard and report pages
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod grouping;
mod query;
mod transactions_page;

pub use self::core::{
    TimeOfDay, Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use grouping::{
    TransactionSummary, fill_daily_totals, percent_of, sum_by_category, sum_by_day, sum_by_hour,
    summarize,
};
pub use query::{TransactionFilter, TransactionPage, get_transaction_page, get_transactions};
pub use transactions_page::get_transactions_page;
