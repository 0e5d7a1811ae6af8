//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, category::create_category_table,
    revenue::create_revenue_table, transaction::create_transaction_table,
};

/// The integer type SQLite uses for row IDs.
pub type DatabaseId = i64;

/// Create the application tables if they do not already exist.
///
/// # Errors
/// Returns an error if the database schema could not be created.
pub fn initialize_db(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_revenue_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
