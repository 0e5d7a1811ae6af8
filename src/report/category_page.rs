//! Render the drill-down report for a single category.
//!
//! The report covers the user's full expense history for the selected
//! category. Opening the page without a valid category sends the user back to
//! the overview with a notice.

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
        charts::daily_spending_chart,
        components::{back_to_reports_link, matched_transactions_table, summary_cards},
    },
    transaction::{
        Transaction, TransactionFilter, TransactionSummary, get_transactions, sum_by_day,
        summarize,
    },
};

/// The query parameters accepted by the category report page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CategoryReportQuery {
    pub(crate) category: Option<String>,
}

/// The state needed for the category report page.
#[derive(Debug, Clone)]
pub struct CategoryReportState {
    /// The database connection for reading the user's transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render a report of the user's spending in one category.
pub async fn get_category_report_page(
    State(state): State<CategoryReportState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<CategoryReportQuery>,
) -> Result<Response, Error> {
    let Some(category_id) = query
        .category
        .as_deref()
        .and_then(|raw_id| CategoryId::new(raw_id).ok())
    else {
        let redirect_url = format!("{}?missing=category", endpoints::REPORTS_VIEW);
        return Ok(Redirect::to(&redirect_url).into_response());
    };

    let (transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        let filter = TransactionFilter {
            category_id: Some(category_id.clone()),
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
    let category_name = category_names
        .get(&category_id)
        .cloned()
        .unwrap_or_else(|| category_id.to_string());

    let expenses: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| transaction.is_expense)
        .collect();
    let summary = summarize(&expenses);
    let daily_totals = sum_by_day(&expenses);
    let chart = ChartPanel {
        id: "category-report-chart",
        options: daily_spending_chart(&category_name, &daily_totals).to_string(),
    };

    Ok(
        category_report_view(&category_name, &summary, &chart, &expenses, &category_names)
            .into_response(),
    )
}

/// Renders the category report page.
fn category_report_view(
    category_name: &str,
    summary: &TransactionSummary,
    chart: &ChartPanel,
    expenses: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let cards = [
        ("Transactions", summary.count.to_string()),
        ("Total Spent", format_currency(summary.total)),
        ("Average per Transaction", format_currency(summary.mean)),
    ];

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Category Report: " (category_name) }

                    (back_to_reports_link())
                }

                (summary_cards(&cards))

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

    base("Category Report", &scripts, &content)
}

#[cfg(test)]
mod category_report_tests {
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

    use super::{CategoryReportQuery, CategoryReportState, get_category_report_page};

    fn get_test_state() -> CategoryReportState {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();

        CategoryReportState {
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

    fn create_test_category(id: &str, name: &str, connection: &Connection) -> CategoryId {
        create_category(
            Category {
                id: CategoryId::new_unchecked(id),
                name: CategoryName::new_unchecked(name),
            },
            connection,
        )
        .expect("Could not create test category")
        .id
    }

    fn query_for(category: &str) -> Query<CategoryReportQuery> {
        Query(CategoryReportQuery {
            category: Some(category.to_owned()),
        })
    }

    #[tokio::test]
    async fn summarizes_expenses_in_the_category() {
        let state = get_test_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let user_id = create_test_user("alice", &connection);
            let groceries = create_test_category("0712", "Groceries", &connection);
            let dining = create_test_category("0813", "Dining", &connection);
            create_transaction(
                Transaction::build(
                    50.0,
                    date!(2025 - 03 - 01),
                    TimeOfDay::new_unchecked("12:30"),
                    groceries.clone(),
                    "Weekly shop",
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
                    groceries.clone(),
                    "Top up",
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
            create_transaction(
                Transaction::build(
                    99.0,
                    date!(2025 - 03 - 02),
                    TimeOfDay::new_unchecked("19:00"),
                    dining,
                    "Dinner out",
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
            create_transaction(
                Transaction::build(
                    12.0,
                    date!(2025 - 03 - 03),
                    TimeOfDay::new_unchecked("09:00"),
                    groceries,
                    "Bottle refund",
                )
                .is_expense(false),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");

            user_id
        };

        let response = get_category_report_page(State(state), Extension(user_id), query_for("0712"))
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
        assert!(summary_text.contains('2'), "want 2 transactions counted");
        assert!(summary_text.contains("$80.00"), "want total $80.00");
        assert!(summary_text.contains("$40.00"), "want mean $40.00");

        let page_text = html.root_element().text().collect::<String>();
        assert!(page_text.contains("Category Report: Groceries"));
        assert!(page_text.contains("Weekly shop"));
        assert!(!page_text.contains("Dinner out"));
        assert!(!page_text.contains("Bottle refund"));
    }

    #[tokio::test]
    async fn redirects_when_no_category_selected() {
        let state = get_test_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_test_user("alice", &connection)
        };

        let response = get_category_report_page(
            State(state),
            Extension(user_id),
            Query(CategoryReportQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_header(&response, "location"),
            "/reports?missing=category"
        );
    }

    #[tokio::test]
    async fn redirects_when_category_id_is_invalid() {
        let state = get_test_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_test_user("alice", &connection)
        };

        let response = get_category_report_page(State(state), Extension(user_id), query_for("12ab"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_header(&response, "location"),
            "/reports?missing=category"
        );
    }
}
