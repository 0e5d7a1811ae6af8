//! Defines the revenue entry model and the database functions for managing
//! revenue entries.
//!
//! Revenue entries belong directly to a user, so ownership checks can tell
//! apart a missing entry from an entry that belongs to someone else.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use time::Date;

use crate::{Error, auth::UserId, db::DatabaseId};

/// The maximum length of a revenue description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// The source of a revenue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevenueType {
    /// Wages from regular employment.
    Salary,
    /// Payment for contract or freelance work.
    Freelance,
    /// Returns from shares, funds and other investments.
    Investments,
    /// Rent collected from a property.
    Rent,
    /// Anything that does not fit the other types.
    Other,
    /// Interest earned on bank deposits.
    BankInterest,
}

impl RevenueType {
    /// Every revenue type, in the order they appear in forms.
    pub const ALL: [RevenueType; 6] = [
        RevenueType::Salary,
        RevenueType::Freelance,
        RevenueType::Investments,
        RevenueType::Rent,
        RevenueType::Other,
        RevenueType::BankInterest,
    ];

    /// The label shown in forms and stored in the database.
    pub fn label(self) -> &'static str {
        match self {
            RevenueType::Salary => "Salary",
            RevenueType::Freelance => "Freelance",
            RevenueType::Investments => "Investments",
            RevenueType::Rent => "Rent",
            RevenueType::Other => "Other",
            RevenueType::BankInterest => "Bank Interest",
        }
    }
}

impl Display for RevenueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RevenueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RevenueType::ALL
            .into_iter()
            .find(|revenue_type| revenue_type.label() == s)
            .ok_or_else(|| Error::InvalidRevenueType(s.to_owned()))
    }
}

/// A record of money received from a revenue source.
#[derive(Clone, Debug, PartialEq)]
pub struct Revenue {
    /// The ID of the revenue entry in the database.
    pub id: DatabaseId,
    /// The amount received in dollars. Always greater than zero.
    pub amount: f64,
    /// A human-readable description of the revenue entry.
    pub description: String,
    /// The date when the money was received.
    pub date: Date,
    /// The source of the revenue.
    pub revenue_type: RevenueType,
}

impl Revenue {
    /// Create a builder for inserting a revenue entry into the database.
    pub fn build(
        amount: f64,
        date: Date,
        revenue_type: RevenueType,
        description: &str,
    ) -> RevenueBuilder {
        RevenueBuilder {
            amount,
            date,
            revenue_type,
            description: description.to_owned(),
        }
    }
}

/// An intermediate representation of a revenue entry before it is stored in
/// the database.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueBuilder {
    /// The amount received in dollars.
    pub amount: f64,
    /// The date when the money was received. Must not be in the future.
    pub date: Date,
    /// The source of the revenue.
    pub revenue_type: RevenueType,
    /// A human-readable description of the revenue entry.
    pub description: String,
}

fn validate_builder(builder: &RevenueBuilder) -> Result<(), Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let description_length = builder.description.chars().count();
    if description_length > MAX_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooLong(description_length));
    }

    Ok(())
}

/// Create a revenue entry in the database for the user `user_id`.
///
/// # Errors
/// Returns an error if the amount is not positive, the description is too
/// long, or there is an unexpected SQL error.
pub fn create_revenue(
    builder: RevenueBuilder,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Revenue, Error> {
    validate_builder(&builder)?;

    connection
        .prepare(
            "INSERT INTO revenue (user_id, amount, description, date, type)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, amount, description, date, type;",
        )?
        .query_row(
            (
                user_id.as_str(),
                builder.amount,
                &builder.description,
                &builder.date,
                builder.revenue_type.label(),
            ),
            map_revenue_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the revenue entry with `id` on behalf of the user `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such entry and
/// [Error::Forbidden] if the entry belongs to another user.
pub fn get_revenue(
    id: DatabaseId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Revenue, Error> {
    let (revenue, owner_id) = connection
        .prepare("SELECT id, amount, description, date, type, user_id FROM revenue WHERE id = ?1;")?
        .query_row((id,), |row| {
            Ok((map_revenue_row(row)?, row.get::<usize, String>(5)?))
        })
        .map_err(Error::from)?;

    if owner_id != user_id.as_str() {
        return Err(Error::Forbidden);
    }

    Ok(revenue)
}

/// Overwrite the revenue entry with `id` with the contents of `builder`.
///
/// # Errors
/// Returns [Error::UpdateMissingRevenue] if there is no such entry,
/// [Error::Forbidden] if the entry belongs to another user, or a validation
/// error for a bad amount or description.
pub fn update_revenue(
    id: DatabaseId,
    user_id: &UserId,
    builder: RevenueBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    validate_builder(&builder)?;

    match get_revenue(id, user_id, connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::UpdateMissingRevenue),
        Err(error) => return Err(error),
    }

    connection.execute(
        "UPDATE revenue SET amount = ?1, description = ?2, date = ?3, type = ?4 WHERE id = ?5;",
        (
            builder.amount,
            &builder.description,
            &builder.date,
            builder.revenue_type.label(),
            id,
        ),
    )?;

    Ok(())
}

/// Delete the revenue entry with `id` on behalf of the user `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingRevenue] if there is no such entry and
/// [Error::Forbidden] if the entry belongs to another user.
pub fn delete_revenue(
    id: DatabaseId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<(), Error> {
    match get_revenue(id, user_id, connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::DeleteMissingRevenue),
        Err(error) => return Err(error),
    }

    connection.execute("DELETE FROM revenue WHERE id = ?1;", (id,))?;

    Ok(())
}

/// Create the revenue table in the database.
pub fn create_revenue_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS revenue (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id)
            );",
        (),
    )?;

    // Speed up the per-user listing which sorts by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_revenue_user_date ON revenue(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Revenue] instance.
///
/// The row must contain the columns id, amount, description, date and type,
/// in that order.
pub(crate) fn map_revenue_row(row: &Row) -> Result<Revenue, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let date = row.get(3)?;
    let type_label: String = row.get(4)?;
    let revenue_type = type_label.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("invalid revenue type {type_label}").into(),
        )
    })?;

    Ok(Revenue {
        id,
        amount,
        description,
        date,
        revenue_type,
    })
}
