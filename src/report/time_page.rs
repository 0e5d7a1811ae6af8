//! Render the drill-down report for a time-of-day range.
//!
//! The report covers the user's expenses recorded between two times of day,
//! both inclusive, across their full history, and groups the totals by hour.
//! Opening the page without two valid times sends the user back to the
//! overview with a notice.

use std::{
    collections::HashMap,
    slice,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
// Must use axum_extra's Query since that parses an empty string as None
// instead of rejecting the request like axum::Query.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserId,
    category::{CategoryId, get_all_categories},
    charts::{ChartPanel, charts_script, charts_view},
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    report::{
        charts::hourly_spending_chart,
        components::{back_to_reports_link, matched_transactions_table, summary_cards},
    },
    transaction::{
        TimeOfDay, Transaction, TransactionFilter, get_transactions, sum_by_hour, summarize,
    },
};

/// The query parameters accepted by the time report page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TimeReportQuery {
    pub(crate) time_from: Option<String>,
    pub(crate) time_to: Option<String>,
}

/// The state needed for the time report page.
#[derive(Debug, Clone)]
pub struct TimeReportState {
    /// The database connection for reading the user's transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TimeReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render a report of the user's spending within a time-of-day range.
pub async fn get_time_report_page(
    State(state): State<TimeReportState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TimeReportQuery>,
) -> Result<Response, Error> {
    let time_from = query
        .time_from
        .as_deref()
        .and_then(|raw_time| TimeOfDay::new(raw_time).ok());
    let time_to = query
        .time_to
        .as_deref()
        .and_then(|raw_time| TimeOfDay::new(raw_time).ok());
    let (Some(time_from), Some(time_to)) = (time_from, time_to) else {
        let redirect_url = format!("{}?missing=times", endpoints::REPORTS_VIEW);
        return Ok(Redirect::to(&redirect_url).into_response());
    };

    let (transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        let filter = TransactionFilter {
            time_from: Some(time_from.clone()),
            time_to: Some(time_to.clone()),
            ..TransactionFilter::default()
        };
        let transactions = get_transactions(&user_id, &filter, &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

        (transactions, categories)
    };

    let category_names: HashMap<CategoryId, String> = categories
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();
    let expenses: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| transaction.is_expense)
        .collect();

    let summary = summarize(&expenses);
    let hourly_totals = sum_by_hour(&expenses);
    let subtext = format!("{time_from} to {time_to}");
    let chart = ChartPanel {
        id: "time-report-chart",
        options: hourly_spending_chart(&subtext, &hourly_totals).to_string(),
    };

    let cards = [
        ("Transactions", summary.count.to_string()),
        ("Total Spent", format_currency(summary.total)),
        ("Average per Transaction", format_currency(summary.mean)),
    ];

    Ok(time_report_view(
        &time_from,
        &time_to,
        &cards,
        &chart,
        &expenses,
        &category_names,
    )
    .into_response())
}

/// Renders the time report page.
fn time_report_view(
    time_from: &TimeOfDay,
    time_to: &TimeOfDay,
    cards: &[(&str, String)],
    chart: &ChartPanel,
    expenses: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold"
                    {
                        "Time Report: " (time_from) " to " (time_to)
                    }

                    (back_to_reports_link())
                }

                (summary_cards(cards))

                @if !expenses.is_empty() {
                    (charts_view(slice::from_ref(chart)))
                }

                (matched_transactions_table(expenses, category_names))
            }
        }
    );

    let scripts = if expenses.is_empty() {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            charts_script(slice::from_ref(chart)),
        ]
    };

    base("Time Report", &scripts, &content)
}
