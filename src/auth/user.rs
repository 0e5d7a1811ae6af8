//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for user IDs.
///
/// User IDs are free-form strings chosen by the user at registration.
/// The wrapper helps disambiguate user IDs from other strings such as emails,
/// leading to better compile time errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The ID the user picked at registration.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email address. Must be unique across users.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The monthly spending limit the user set for themselves.
    pub budget: f64,
    /// The user's monthly income.
    pub monthly_income: f64,
}

/// Create the user table and indexes.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            budget REAL NOT NULL DEFAULT 0,
            monthly_income REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_user_email ON user(email);",
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// This function will return an error if:
/// - the user ID is already taken ([Error::DuplicateUserId]),
/// - the email address is already registered ([Error::DuplicateEmail]),
/// - or there was some other SQL error.
pub fn create_user(user: User, connection: &Connection) -> Result<User, Error> {
    let insert_result = connection.execute(
        "INSERT INTO user (id, name, email, password, budget, monthly_income)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user.id.as_str(),
            &user.name,
            &user.email,
            &user.password_hash.to_string(),
            user.budget,
            user.monthly_income,
        ),
    );

    match insert_result {
        Ok(_) => Ok(user),
        // Code 1555 occurs when a primary key constraint failed.
        Err(rusqlite::Error::SqliteFailure(sql_error, Some(ref description)))
            if sql_error.extended_code == 1555 && description.contains("user.id") =>
        {
            Err(Error::DuplicateUserId(user.id.to_string()))
        }
        // Code 2067 occurs when a UNIQUE constraint failed.
        Err(rusqlite::Error::SqliteFailure(sql_error, Some(ref description)))
            if sql_error.extended_code == 2067 && description.contains("user.email") =>
        {
            Err(Error::DuplicateEmail(user.email))
        }
        Err(error) => Err(error.into()),
    }
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: &UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, email, password, budget, monthly_income
                FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_str())], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email address equal to `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - no registered user has the email address `email`.
/// - there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, email, password, budget, monthly_income
                FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &email)], map_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_user_password(
    user_id: &UserId,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.to_string(), user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserId::new(raw_id),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        budget: row.get(4)?,
        monthly_income: row.get(5)?,
    })
}
