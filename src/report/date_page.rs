//! Render the drill-down report for a date range.
//!
//! The report covers the user's expenses between two dates, both inclusive,
//! and averages the total over every day in the range. Opening the page
//! without both dates sends the user back to the overview with a notice.

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
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    category::{CategoryId, get_all_categories},
    charts::{ChartPanel, charts_script, charts_view},
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    report::{
        charts::daily_spending_chart,
        components::{back_to_reports_link, matched_transactions_table, summary_cards},
    },
    transaction::{Transaction, TransactionFilter, get_transactions, sum_by_day, summarize},
};

/// The query parameters accepted by the date report page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DateReportQuery {
    pub(crate) date_from: Option<Date>,
    pub(crate) date_to: Option<Date>,
}

/// The state needed for the date report page.
#[derive(Debug, Clone)]
pub struct DateReportState {
    /// The database connection for reading the user's transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DateReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render a report of the user's spending between two dates.
pub async fn get_date_report_page(
    State(state): State<DateReportState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<DateReportQuery>,
) -> Result<Response, Error> {
    let (Some(date_from), Some(date_to)) = (query.date_from, query.date_to) else {
        let redirect_url = format!("{}?missing=dates", endpoints::REPORTS_VIEW);
        return Ok(Redirect::to(&redirect_url).into_response());
    };

    let (transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        let filter = TransactionFilter {
            date_from: Some(date_from),
            date_to: Some(date_to),
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
    let daily_average = daily_average(summary.total, date_from, date_to);
    let daily_totals = sum_by_day(&expenses);
    let subtext = format!("{date_from} to {date_to}");
    let chart = ChartPanel {
        id: "date-report-chart",
        options: daily_spending_chart(&subtext, &daily_totals).to_string(),
    };

    let cards = [
        ("Transactions", summary.count.to_string()),
        ("Total Spent", format_currency(summary.total)),
        ("Daily Average", format_currency(daily_average)),
    ];

    Ok(date_report_view(
        date_from,
        date_to,
        &cards,
        &chart,
        &expenses,
        &category_names,
    )
    .into_response())
}

/// The average spent per day over the range, counting both end dates.
///
/// A range that ends before it starts has no days, so the average is zero.
fn daily_average(total: f64, date_from: Date, date_to: Date) -> f64 {
    let day_count = (date_to - date_from).whole_days() + 1;

    if day_count > 0 {
        total / day_count as f64
    } else {
        0.0
    }
}

/// Renders the date report page.
fn date_report_view(
    date_from: Date,
    date_to: Date,
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
                        "Date Report: " (date_from) " to " (date_to)
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

    base("Date Report", &scripts, &content)
}


#[cfg(test)]
mod date_report_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, User, UserId, create_user},
        category::{Category, CategoryId, CategoryName, create_category},
        db::initialize_db,
        test_utils::{assert_valid_html, get_header, parse_html_document},
        transaction::{TimeOfDay, Transaction, create_transaction},
    };

    use super::{DateReportQuery, DateReportState, get_date_report_page};

    fn get_test_state() -> DateReportState {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();

        DateReportState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn create_test_user(id: &str, connection: &Connection) -> UserId {
        create_user(
            User {
                id: UserId::new(id),
                name: id.to_owned(),
                email: format!("{id}@example.com"),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                budget: 1000.0,
                monthly_income: 2000.0,
            },
            connection,
        )
        .expect("Could not create test user")
        .id
    }

    fn create_test_category(connection: &Connection) -> CategoryId {
        create_category(
            Category {
                id: CategoryId::new_unchecked("0712"),
                name: CategoryName::new_unchecked("Groceries"),
            },
            connection,
        )
        .expect("Could not create test category")
        .id
    }

    fn seed_two_days(state: &DateReportState) -> UserId {
        let connection = state.db_connection.lock().unwrap();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category(&connection);
        create_transaction(
            Transaction::build(
                50.0,
                date!(2025 - 03 - 01),
                TimeOfDay::new_unchecked("12:30"),
                category_id.clone(),
                "First day",
            ),
            &user_id,
            &connection,
        )
        .expect("Could not create transaction");
        create_transaction(
            Transaction::build(
                30.0,
                date!(2025 - 03 - 02),
                TimeOfDay::new_unchecked("18:00"),
                category_id,
                "Second day",
            ),
            &user_id,
            &connection,
        )
        .expect("Could not create transaction");

        user_id
    }

    #[tokio::test]
    async fn includes_both_boundary_dates() {
        let state = get_test_state();
        let user_id = seed_two_days(&state);
        let query = DateReportQuery {
            date_from: Some(date!(2025 - 03 - 01)),
            date_to: Some(date!(2025 - 03 - 02)),
        };

        let response = get_date_report_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let summary_text = html
            .select(&Selector::parse("#report-summary").unwrap())
            .next()
            .expect("No summary section found")
            .text()
            .collect::<String>();
        assert!(summary_text.contains("$80.00"), "want total $80.00");
        assert!(summary_text.contains("$40.00"), "want daily average $40.00");
    }

    #[tokio::test]
    async fn excludes_transactions_outside_the_range() {
        let state = get_test_state();
        let user_id = seed_two_days(&state);
        let query = DateReportQuery {
            date_from: Some(date!(2025 - 03 - 01)),
            date_to: Some(date!(2025 - 03 - 01)),
        };

        let response = get_date_report_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let summary_text = html
            .select(&Selector::parse("#report-summary").unwrap())
            .next()
            .expect("No summary section found")
            .text()
            .collect::<String>();
        assert!(summary_text.contains("$50.00"), "want total $50.00");

        let page_text = html.root_element().text().collect::<String>();
        assert!(page_text.contains("First day"));
        assert!(!page_text.contains("Second day"));
    }

    #[tokio::test]
    async fn redirects_when_either_date_is_missing() {
        let state = get_test_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_test_user("alice", &connection)
        };
        let query = DateReportQuery {
            date_from: Some(date!(2025 - 03 - 01)),
            date_to: None,
        };

        let response = get_date_report_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), "/reports?missing=dates");
    }
}
