//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserId, category::CategoryId, db::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// A 24-hour wall-clock time in the format `HH:MM`.
///
/// The string is zero-padded, so comparing times lexicographically gives the
/// same order as comparing them chronologically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay(String);

impl TimeOfDay {
    /// Create a time of day from a zero-padded 24-hour `HH:MM` string.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidTime] if `time` is not in
    /// the format `HH:MM` or is out of range.
    pub fn new(time: &str) -> Result<Self, Error> {
        let time = time.trim();

        let is_valid_format = time.len() == 5
            && time.as_bytes()[2] == b':'
            && time[..2].chars().all(|character| character.is_ascii_digit())
            && time[3..].chars().all(|character| character.is_ascii_digit());

        if !is_valid_format {
            return Err(Error::InvalidTime(time.to_string()));
        }

        let hour: u8 = time[..2]
            .parse()
            .map_err(|_| Error::InvalidTime(time.to_string()))?;
        let minute: u8 = time[3..]
            .parse()
            .map_err(|_| Error::InvalidTime(time.to_string()))?;

        if hour > 23 || minute > 59 {
            return Err(Error::InvalidTime(time.to_string()));
        }

        Ok(Self(time.to_string()))
    }

    /// Create a time of day without validation.
    ///
    /// The caller should ensure that the string is a zero-padded 24-hour
    /// `HH:MM` time.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the format invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(time: &str) -> Self {
        Self(time.to_string())
    }

    /// The hour component as a zero-padded string, e.g. "09".
    pub fn hour(&self) -> &str {
        &self.0[..2]
    }
}

impl AsRef<str> for TimeOfDay {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// When the transaction happened.
    pub date: Date,
    /// The wall-clock time when the transaction happened.
    pub time: TimeOfDay,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the transaction records money spent rather than received.
    pub is_expense: bool,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        date: Date,
        time: TimeOfDay,
        category_id: CategoryId,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            time,
            category_id,
            description: description.to_owned(),
            is_expense: true,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Transactions default to expenses since that is what users record most of
/// the time. Use [TransactionBuilder::is_expense] to record income instead.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction in dollars.
    pub amount: f64,
    /// The date when the transaction occurred. Must not be in the future.
    pub date: Date,
    /// The wall-clock time when the transaction occurred.
    pub time: TimeOfDay,
    /// The category of the transaction, e.g. "0712" for groceries.
    pub category_id: CategoryId,
    /// A human-readable description of the transaction.
    pub description: String,
    /// Whether the transaction is an expense (money out) or income (money in).
    pub is_expense: bool,
}

impl TransactionBuilder {
    /// Set whether the transaction is an expense.
    pub fn is_expense(mut self, is_expense: bool) -> Self {
        self.is_expense = is_expense;
        self
    }
}

/// Whether a transaction records money spent or money received.
///
/// Used for the expense/income radio buttons on the transaction forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money spent.
    Expense,
    /// Money received.
    Income,
}

impl TransactionKind {
    /// Whether this kind records money spent.
    pub fn is_expense(self) -> bool {
        matches!(self, TransactionKind::Expense)
    }

    /// The kind matching an [is_expense](Transaction::is_expense) flag.
    pub fn from_is_expense(is_expense: bool) -> Self {
        if is_expense {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder and associate it
/// with the user `user_id`.
///
/// The transaction row and its association row are inserted in a single unit
/// of work, so either both rows exist afterwards or neither does.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    // unchecked_transaction because a checked transaction needs &mut
    // Connection, and we only have &Connection behind the mutex.
    let sql_transaction = connection.unchecked_transaction()?;

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" (date, time, category_id, description, amount, is_expense)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, date, time, category_id, description, amount, is_expense",
        )?
        .query_row(
            (
                &builder.date,
                builder.time.as_ref(),
                builder.category_id.as_ref(),
                &builder.description,
                builder.amount,
                builder.is_expense,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(builder.category_id.clone())),
            error => error.into(),
        })?;

    sql_transaction.execute(
        "INSERT INTO user_transaction (user_id, transaction_id) VALUES (?1, ?2)",
        (user_id.as_str(), transaction.id),
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: DatabaseId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".id, date, time, category_id, description, amount, is_expense
             FROM \"transaction\"
             INNER JOIN user_transaction ON user_transaction.transaction_id = \"transaction\".id
             WHERE \"transaction\".id = ?1 AND user_transaction.user_id = ?2",
        )?
        .query_row((id, user_id.as_str()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Update a transaction owned by `user_id` in place.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - [Error::InvalidCategory] if the new category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: DatabaseId,
    user_id: &UserId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
             SET date = ?1, time = ?2, category_id = ?3, description = ?4, amount = ?5, is_expense = ?6
             WHERE id = ?7
               AND id IN (SELECT transaction_id FROM user_transaction WHERE user_id = ?8)",
            (
                &builder.date,
                builder.time.as_ref(),
                builder.category_id.as_ref(),
                &builder.description,
                builder.amount,
                builder.is_expense,
                id,
                user_id.as_str(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(builder.category_id.clone())),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`.
///
/// The association row and the transaction row are deleted in a single unit
/// of work, so either both rows are removed or neither is.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: DatabaseId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let rows_affected = sql_transaction.execute(
        "DELETE FROM user_transaction WHERE transaction_id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    sql_transaction.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    sql_transaction.commit()?;

    Ok(())
}

/// Create the transaction and user_transaction tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                category_id TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                is_expense INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Add composite index used by the dashboard and report pages.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_category ON \"transaction\"(date, category_id);",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_transaction (
                user_id TEXT NOT NULL,
                transaction_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, transaction_id),
                FOREIGN KEY(user_id) REFERENCES user(id),
                FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id)
                )",
        (),
    )?;

    // Speed up the ownership join from the transaction side.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_transaction_transaction
         ON user_transaction(transaction_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns id, date, time, category_id, description, amount and
/// is_expense in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let time: String = row.get(2)?;
    let category_id: String = row.get(3)?;
    let description = row.get(4)?;
    let amount = row.get(5)?;
    let is_expense = row.get(6)?;

    Ok(Transaction {
        id,
        date,
        time: TimeOfDay::new_unchecked(&time),
        category_id: CategoryId::new_unchecked(&category_id),
        description,
        amount,
        is_expense,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod time_of_day_tests {
    use crate::{Error, transaction::TimeOfDay};

    #[test]
    fn new_succeeds_on_valid_time() {
        let time = TimeOfDay::new("09:30");

        assert_eq!(time.map(|time| time.to_string()), Ok("09:30".to_owned()));
    }

    #[test]
    fn new_trims_whitespace() {
        let time = TimeOfDay::new(" 23:59\n");

        assert_eq!(time.map(|time| time.to_string()), Ok("23:59".to_owned()));
    }

    #[test]
    fn new_fails_without_zero_padding() {
        let time = TimeOfDay::new("9:30");

        assert_eq!(time, Err(Error::InvalidTime("9:30".to_owned())));
    }

    #[test]
    fn new_fails_on_hour_out_of_range() {
        let time = TimeOfDay::new("24:00");

        assert_eq!(time, Err(Error::InvalidTime("24:00".to_owned())));
    }

    #[test]
    fn new_fails_on_minute_out_of_range() {
        let time = TimeOfDay::new("12:60");

        assert_eq!(time, Err(Error::InvalidTime("12:60".to_owned())));
    }

    #[test]
    fn new_fails_on_wrong_separator() {
        let time = TimeOfDay::new("12-30");

        assert_eq!(time, Err(Error::InvalidTime("12-30".to_owned())));
    }

    #[test]
    fn new_fails_on_empty_string() {
        let time = TimeOfDay::new("");

        assert_eq!(time, Err(Error::InvalidTime("".to_owned())));
    }

    #[test]
    fn hour_returns_zero_padded_hour() {
        let time = TimeOfDay::new_unchecked("08:45");

        assert_eq!(time.hour(), "08");
    }
}
