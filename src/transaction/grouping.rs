//! Aggregation helpers for the dashboard and report pages.
//!
//! These functions operate on transactions that have already been fetched
//! and filtered, so callers decide whether they are summing expenses,
//! income or a mix.

use std::collections::{BTreeMap, HashMap};

use time::Date;

use crate::category::CategoryId;

use super::core::Transaction;

/// Headline figures for a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionSummary {
    /// How many transactions were summarized.
    pub count: usize,
    /// The sum of the transaction amounts.
    pub total: f64,
    /// The average transaction amount, or zero for an empty set.
    pub mean: f64,
}

/// Summarize the count, total and mean amount of `transactions`.
pub fn summarize(transactions: &[Transaction]) -> TransactionSummary {
    let count = transactions.len();
    let total = transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum();
    let mean = if count == 0 {
        0.0
    } else {
        total / count as f64
    };

    TransactionSummary { count, total, mean }
}

/// Sum transaction amounts per category.
///
/// Categories with no transactions do not appear in the result. Callers
/// resolve category IDs to display names with their own lookup.
pub fn sum_by_category(transactions: &[Transaction]) -> HashMap<CategoryId, f64> {
    let mut totals: HashMap<CategoryId, f64> = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category_id.clone()).or_default() += transaction.amount;
    }

    totals
}

/// Sum transaction amounts per calendar day.
///
/// Days with no transactions do not appear in the result, use
/// [fill_daily_totals] to zero-fill a range for charting.
pub fn sum_by_day(transactions: &[Transaction]) -> BTreeMap<Date, f64> {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    for transaction in transactions {
        *totals.entry(transaction.date).or_default() += transaction.amount;
    }

    totals
}

/// Sum transaction amounts per hour of the day, keyed "HH:00".
///
/// Hours with no transactions do not appear in the result.
pub fn sum_by_hour(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for transaction in transactions {
        let bucket = format!("{}:00", transaction.time.hour());
        *totals.entry(bucket).or_default() += transaction.amount;
    }

    totals
}

/// Expand per-day totals into one entry per day over the inclusive range
/// `from..=to`, filling days without transactions with zero.
pub fn fill_daily_totals(
    totals: &BTreeMap<Date, f64>,
    from: Date,
    to: Date,
) -> Vec<(Date, f64)> {
    let mut filled = Vec::new();
    let mut date = from;

    while date <= to {
        filled.push((date, totals.get(&date).copied().unwrap_or(0.0)));

        match date.next_day() {
            Some(next_day) => date = next_day,
            None => break,
        }
    }

    filled
}

/// The whole-number percentage that `value` makes up of `total`, or zero
/// when `total` is zero.
pub fn percent_of(value: f64, total: f64) -> i64 {
    if total == 0.0 {
        0
    } else {
        ((value / total) * 100.0).round() as i64
    }
}
