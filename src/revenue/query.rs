//! Database queries and aggregation helpers for revenue entries.

use std::collections::{BTreeMap, HashMap};

use rusqlite::{Connection, ToSql, params_from_iter};
use time::Date;

use crate::{Error, auth::UserId};

use super::core::{Revenue, RevenueType, map_revenue_row};

/// A single page of revenue entries along with the page count and the
/// user's all-time revenue total.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenuePage {
    /// The revenue entries on the requested page, newest first.
    pub revenues: Vec<Revenue>,
    /// How many pages the user's revenue entries span.
    pub page_count: u64,
    /// The sum of every revenue entry the user has, across all pages.
    pub total: f64,
}

/// Build the WHERE clause and parameters for `user_id`'s revenue entries,
/// optionally restricted to an inclusive date range.
fn revenue_conditions(
    user_id: &UserId,
    date_from: Option<Date>,
    date_to: Option<Date>,
) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = vec!["user_id = ?1".to_owned()];
    let mut parameters: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_str().to_owned())];

    if let Some(date_from) = date_from {
        parameters.push(Box::new(date_from));
        conditions.push(format!("date >= ?{}", parameters.len()));
    }

    if let Some(date_to) = date_to {
        parameters.push(Box::new(date_to));
        conditions.push(format!("date <= ?{}", parameters.len()));
    }

    (conditions.join(" AND "), parameters)
}

/// Get all of `user_id`'s revenue entries within the inclusive date range,
/// newest first. Unset bounds match everything on that side.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_revenues(
    user_id: &UserId,
    date_from: Option<Date>,
    date_to: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Revenue>, Error> {
    let (where_clause, parameters) = revenue_conditions(user_id, date_from, date_to);

    // Sort by date, then ID to keep the order stable after updates.
    let query = format!(
        "SELECT id, amount, description, date, type \
        FROM revenue \
        WHERE {where_clause} \
        ORDER BY date DESC, id ASC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), map_revenue_row)?
        .map(|revenue_result| revenue_result.map_err(Error::SqlError))
        .collect()
}

/// Get one page of `user_id`'s revenue entries, newest first, along with the
/// all-time revenue total.
///
/// `page_number` starts at 1. A page number past the end of the result set
/// yields an empty page rather than an error.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_revenue_page(
    user_id: &UserId,
    page_number: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<RevenuePage, Error> {
    let (revenue_count, total): (i64, f64) = connection
        .prepare("SELECT COUNT(1), COALESCE(SUM(amount), 0) FROM revenue WHERE user_id = ?1;")?
        .query_row((user_id.as_str(),), |row| Ok((row.get(0)?, row.get(1)?)))?;
    let page_count = (revenue_count as u64).div_ceil(page_size);

    let offset = page_number.saturating_sub(1) * page_size;
    let page_query = format!(
        "SELECT id, amount, description, date, type \
        FROM revenue \
        WHERE user_id = ?1 \
        ORDER BY date DESC, id ASC \
        LIMIT {page_size} OFFSET {offset}"
    );

    let revenues = connection
        .prepare(&page_query)?
        .query_map((user_id.as_str(),), map_revenue_row)?
        .map(|revenue_result| revenue_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RevenuePage {
        revenues,
        page_count,
        total,
    })
}

/// Sum revenue amounts per revenue type.
pub fn sum_by_type(revenues: &[Revenue]) -> HashMap<RevenueType, f64> {
    let mut sums = HashMap::new();

    for revenue in revenues {
        *sums.entry(revenue.revenue_type).or_insert(0.0) += revenue.amount;
    }

    sums
}

/// Sum revenue amounts per calendar day, sorted ascending by date.
///
/// Days with no revenue are absent from the result.
pub fn sum_by_day(revenues: &[Revenue]) -> BTreeMap<Date, f64> {
    let mut sums = BTreeMap::new();

    for revenue in revenues {
        *sums.entry(revenue.date).or_insert(0.0) += revenue.amount;
    }

    sums
}
