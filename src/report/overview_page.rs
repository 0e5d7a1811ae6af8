//! Render the reports overview page.
//!
//! The overview summarises the selected date range with expense and revenue
//! totals, breakdowns by category and revenue type, and a daily trend chart.
//! It also hosts the forms that lead to the drill-down reports and the links
//! for exporting the transaction history.

use std::{
    collections::HashMap,
    slice,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// Must use axum_extra's Query since that parses an empty string as None
// instead of rejecting the request like axum::Query.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Duration};

use crate::{
    AppState, Error,
    auth::UserId,
    category::{Category, CategoryId, get_all_categories},
    charts::{ChartPanel, charts_script, charts_view},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    report::{charts::daily_trend_chart, components::summary_cards},
    revenue::{Revenue, get_revenues, sum_by_day as sum_revenue_by_day, sum_by_type},
    timezone::local_now,
    transaction::{
        Transaction, TransactionFilter, fill_daily_totals, get_transactions, percent_of,
        sum_by_category, sum_by_day, summarize,
    },
};

/// How many days of history the overview covers without an explicit range.
const DEFAULT_RANGE_DAYS: i64 = 30;

const FILTER_FORM_STYLE: &str = "w-full grid gap-4 rounded border border-gray-200 bg-white \
    p-4 shadow-sm dark:border-gray-700 dark:bg-gray-800";

/// The selection a drill-down report sent the user back to the overview for.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MissingSelection {
    Category,
    Dates,
    Times,
}

impl MissingSelection {
    /// The notice shown at the top of the overview page.
    fn notice(self) -> &'static str {
        match self {
            MissingSelection::Category => "Please select a category.",
            MissingSelection::Dates => "Please select both start and end dates.",
            MissingSelection::Times => "Please select both start and end times.",
        }
    }
}

/// The query parameters accepted by the reports overview page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ReportsQuery {
    pub(crate) start_date: Option<Date>,
    pub(crate) end_date: Option<Date>,
    pub(crate) missing: Option<MissingSelection>,
}

/// The state needed for the reports overview page.
#[derive(Debug, Clone)]
pub struct ReportsViewState {
    /// The database connection for reading the user's data.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for ReportsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A labelled amount with its share of the report total.
struct BreakdownRow {
    label: String,
    amount: f64,
    percent: i64,
}

/// Holds all the data needed to render the reports overview.
struct ReportOverview {
    start_date: Date,
    end_date: Date,
    expense_total: f64,
    revenue_total: f64,
    expense_breakdown: Vec<BreakdownRow>,
    revenue_breakdown: Vec<BreakdownRow>,
    chart: ChartPanel,
}

/// Render an overview report of the user's finances for a date range.
pub async fn get_reports_page(
    State(state): State<ReportsViewState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ReportsQuery>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();
    let end_date = query.end_date.unwrap_or(today);
    let start_date = query
        .start_date
        .unwrap_or(end_date - Duration::days(DEFAULT_RANGE_DAYS));

    let (transactions, revenues, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        let filter = TransactionFilter {
            date_from: Some(start_date),
            date_to: Some(end_date),
            ..TransactionFilter::default()
        };
        let transactions = get_transactions(&user_id, &filter, &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
        let revenues = get_revenues(&user_id, Some(start_date), Some(end_date), &connection)
            .inspect_err(|error| tracing::error!("could not get revenue entries: {error}"))?;
        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

        (transactions, revenues, categories)
    };

    let report = build_overview(&transactions, &revenues, &categories, start_date, end_date);

    Ok(reports_view(&report, &categories, query.missing).into_response())
}

/// Aggregates the date range's transactions and revenue into the overview
/// report.
fn build_overview(
    transactions: &[Transaction],
    revenues: &[Revenue],
    categories: &[Category],
    start_date: Date,
    end_date: Date,
) -> ReportOverview {
    let expenses: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.is_expense)
        .cloned()
        .collect();
    let expense_total = summarize(&expenses).total;
    let revenue_total: f64 = revenues.iter().map(|revenue| revenue.amount).sum();

    let category_names: HashMap<CategoryId, String> = categories
        .iter()
        .map(|category| (category.id.clone(), category.name.to_string()))
        .collect();

    let expense_breakdown =
        breakdown_rows(sum_by_category(&expenses), expense_total, |category_id| {
            category_names
                .get(category_id)
                .cloned()
                .unwrap_or_else(|| category_id.to_string())
        });
    let revenue_breakdown =
        breakdown_rows(sum_by_type(revenues), revenue_total, ToString::to_string);

    let expense_trend = fill_daily_totals(&sum_by_day(&expenses), start_date, end_date);
    let revenue_trend = fill_daily_totals(&sum_revenue_by_day(revenues), start_date, end_date);
    let chart = ChartPanel {
        id: "daily-trend-chart",
        options: daily_trend_chart(&expense_trend, &revenue_trend).to_string(),
    };

    ReportOverview {
        start_date,
        end_date,
        expense_total,
        revenue_total,
        expense_breakdown,
        revenue_breakdown,
        chart,
    }
}

/// Turn keyed totals into labelled rows with their share of `total`, largest
/// first.
fn breakdown_rows<K>(
    totals: HashMap<K, f64>,
    total: f64,
    label: impl Fn(&K) -> String,
) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = totals
        .iter()
        .map(|(key, amount)| BreakdownRow {
            label: label(key),
            amount: *amount,
            percent: percent_of(*amount, total),
        })
        .collect();
    rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    rows
}

/// Renders the reports overview page.
///
/// # Arguments
/// * `report` - The aggregated report data to display
/// * `categories` - The categories to offer in the drill-down form
/// * `missing` - The selection notice to show, if a drill-down redirected back
fn reports_view(
    report: &ReportOverview,
    categories: &[Category],
    missing: Option<MissingSelection>,
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
                    h1 class="text-xl font-bold" { "Reports" }

                    (export_links())
                }

                @if let Some(missing) = missing {
                    div
                        class="w-full p-4 text-sm text-yellow-800 rounded-lg
                            bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
                        role="alert"
                    {
                        (missing.notice())
                    }
                }

                (range_form_view(report.start_date, report.end_date))

                (summary_cards(&[
                    ("Total Expenses", format_currency(report.expense_total)),
                    ("Total Revenue", format_currency(report.revenue_total)),
                ]))

                section id="breakdowns" class="w-full mx-auto mb-4"
                {
                    div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                    {
                        (breakdown_table(
                            "Expenses by Category",
                            &report.expense_breakdown,
                            "No expenses in this range.",
                        ))

                        (breakdown_table(
                            "Revenue by Type",
                            &report.revenue_breakdown,
                            "No revenue in this range.",
                        ))
                    }
                }

                (charts_view(slice::from_ref(&report.chart)))

                (drill_down_forms_view(categories))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(slice::from_ref(&report.chart)),
    ];

    base("Reports", &scripts, &content)
}

/// Renders the links for downloading the transaction history.
fn export_links() -> Markup {
    let export_url = |format: &str| {
        endpoints::format_endpoint(
            &endpoints::format_endpoint(endpoints::EXPORT_REPORT, "current"),
            format,
        )
    };

    html!(
        div class="flex gap-4"
        {
            a href=(export_url("csv")) class=(LINK_STYLE) { "Export CSV" }
            a href=(export_url("excel")) class=(LINK_STYLE) { "Export Excel" }
            a href=(export_url("pdf")) class=(LINK_STYLE) { "Export PDF" }
        }
    )
}

/// Renders the form for changing the overview's date range.
fn range_form_view(start_date: Date, end_date: Date) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::REPORTS_VIEW)
            class={(FILTER_FORM_STYLE) " md:grid-cols-3"}
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }

                input
                    type="date"
                    name="start_date"
                    id="start_date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(start_date);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }

                input
                    type="date"
                    name="end_date"
                    id="end_date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(end_date);
            }

            div class="flex items-end"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
            }
        }
    )
}

/// Renders one of the overview's breakdown tables.
fn breakdown_table(title: &str, rows: &[BreakdownRow], empty_message: &str) -> Markup {
    html!(
        div
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { (title) }
            }

            @if rows.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { (empty_message) }
            } @else {
                div class="overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (row.label) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(row.amount)) }
                                    td class=(TABLE_CELL_STYLE) { (row.percent) "%" }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

/// Renders the forms that lead to the drill-down report pages.
fn drill_down_forms_view(categories: &[Category]) -> Markup {
    html!(
        section id="drill-down-reports" class="w-full mx-auto mb-4"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Drill-Down Reports" }
            }

            div class="grid grid-cols-1 xl:grid-cols-3 gap-4"
            {
                form
                    method="get"
                    action=(endpoints::CATEGORY_REPORT_VIEW)
                    class=(FILTER_FORM_STYLE)
                {
                    h4 class="font-semibold" { "By Category" }

                    div
                    {
                        label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                        select
                            name="category"
                            id="category"
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" { "Select a category" }

                            @for category in categories {
                                option value=(category.id) { (category.name) }
                            }
                        }
                    }

                    div class="flex items-end"
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "View Report" }
                    }
                }

                form
                    method="get"
                    action=(endpoints::DATE_REPORT_VIEW)
                    class=(FILTER_FORM_STYLE)
                {
                    h4 class="font-semibold" { "By Date Range" }

                    div
                    {
                        label for="date_from" class=(FORM_LABEL_STYLE) { "From" }

                        input
                            type="date"
                            name="date_from"
                            id="date_from"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="date_to" class=(FORM_LABEL_STYLE) { "To" }

                        input
                            type="date"
                            name="date_to"
                            id="date_to"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div class="flex items-end"
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "View Report" }
                    }
                }

                form
                    method="get"
                    action=(endpoints::TIME_REPORT_VIEW)
                    class=(FILTER_FORM_STYLE)
                {
                    h4 class="font-semibold" { "By Time of Day" }

                    div
                    {
                        label for="time_from" class=(FORM_LABEL_STYLE) { "From" }

                        input
                            type="time"
                            name="time_from"
                            id="time_from"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="time_to" class=(FORM_LABEL_STYLE) { "To" }

                        input
                            type="time"
                            name="time_to"
                            id="time_to"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div class="flex items-end"
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "View Report" }
                    }
                }
            }
        }
    )
}
