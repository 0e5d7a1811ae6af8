//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The queries that summarise the current month's activity

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    AppState, Error,
    auth::{UserId, get_user_by_id},
    category::{CategoryId, get_all_categories},
    charts::{ChartPanel, charts_script, charts_view},
    dashboard::{
        cards::{MonthToDate, stat_cards_view},
        charts::{expense_breakdown_chart, revenue_breakdown_chart},
        tables::{recent_revenues_table, recent_transactions_table},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    revenue::{get_revenue_page, get_revenues, sum_by_type},
    timezone::local_now,
    transaction::{
        Transaction, TransactionFilter, get_transaction_page, get_transactions, sum_by_category,
        summarize,
    },
};

/// How many recent transactions and revenue entries to show on the dashboard.
const RECENT_ENTRY_COUNT: u64 = 5;

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by the dashboard handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user's data.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    month: MonthToDate,
    charts: [ChartPanel; 2],
    tables: [Markup; 2],
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(&user_id, today, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Fetches and builds all data needed for the dashboard display.
///
/// # Arguments
/// * `user_id` - The user whose data to summarise
/// * `today` - The current date in the local timezone
/// * `connection` - Database connection
///
/// # Returns
/// All dashboard data ready for rendering, or `None` if the user has not
/// recorded any transactions or revenue entries yet.
///
/// # Errors
/// Returns an error if database queries fail.
fn build_dashboard_data(
    user_id: &UserId,
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let user = get_user_by_id(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get user: {error}"))?;

    let recent_transactions = get_transaction_page(
        user_id,
        &TransactionFilter::default(),
        1,
        RECENT_ENTRY_COUNT,
        connection,
    )
    .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?
    .transactions;
    let recent_revenues = get_revenue_page(user_id, 1, RECENT_ENTRY_COUNT, connection)
        .inspect_err(|error| tracing::error!("could not get recent revenue entries: {error}"))?
        .revenues;

    if recent_transactions.is_empty() && recent_revenues.is_empty() {
        return Ok(None);
    }

    let month_start = today - Duration::days(i64::from(today.day()) - 1);
    let month_filter = TransactionFilter {
        date_from: Some(month_start),
        date_to: Some(today),
        ..TransactionFilter::default()
    };
    let month_transactions =
        get_transactions(user_id, &month_filter, connection).inspect_err(|error| {
            tracing::error!("could not get this month's transactions: {error}")
        })?;
    let month_revenues = get_revenues(user_id, Some(month_start), Some(today), connection)
        .inspect_err(|error| {
            tracing::error!("could not get this month's revenue entries: {error}")
        })?;

    let month_expenses: Vec<Transaction> = month_transactions
        .iter()
        .filter(|transaction| transaction.is_expense)
        .cloned()
        .collect();
    let expense_total = summarize(&month_expenses).total;
    let revenue_total: f64 = month_revenues.iter().map(|revenue| revenue.amount).sum();

    let categories = get_all_categories(connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;
    let category_names: HashMap<CategoryId, String> = categories
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    let expense_breakdown = named_totals(sum_by_category(&month_expenses), |category_id| {
        category_names
            .get(category_id)
            .cloned()
            .unwrap_or_else(|| category_id.to_string())
    });
    let revenue_breakdown = named_totals(sum_by_type(&month_revenues), ToString::to_string);

    let charts = [
        ChartPanel {
            id: "expense-breakdown-chart",
            options: expense_breakdown_chart(&expense_breakdown).to_string(),
        },
        ChartPanel {
            id: "revenue-breakdown-chart",
            options: revenue_breakdown_chart(&revenue_breakdown).to_string(),
        },
    ];
    let tables = [
        recent_transactions_table(&recent_transactions, &category_names),
        recent_revenues_table(&recent_revenues),
    ];

    Ok(Some(DashboardData {
        month: MonthToDate {
            expense_total,
            revenue_total,
            budget: user.budget,
            monthly_income: user.monthly_income,
        },
        charts,
        tables,
    }))
}

/// Turn keyed totals into `(label, total)` pairs sorted largest first.
fn named_totals<K>(totals: HashMap<K, f64>, label: impl Fn(&K) -> String) -> Vec<(String, f64)> {
    let mut named: Vec<(String, f64)> = totals
        .iter()
        .map(|(key, total)| (label(key), *total))
        .collect();
    named.sort_by(|a, b| b.1.total_cmp(&a.1));

    named
}

/// Renders the dashboard page when the user has no data yet.
///
/// Displays a short message with links to record a transaction or a revenue
/// entry.
///
/// # Arguments
/// * `nav_bar` - Navigation bar component
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "record a transaction");
    let new_revenue_link = link(endpoints::NEW_REVENUE_VIEW, "record a revenue entry");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you add some data.
                You can " (new_transaction_link) " or " (new_revenue_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with stat cards, charts, and tables.
///
/// # Arguments
/// * `nav_bar` - Navigation bar component
/// * `data` - The dashboard data to display
fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (stat_cards_view(&data.month))

            (charts_view(&data.charts))

            section
                id="recent-activity"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for table in &data.tables {
                        (table)
                    }
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}
