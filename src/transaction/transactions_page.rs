//! Render the page for browsing, filtering and paging through a user's
//! transactions.

use std::{
    collections::HashMap,
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
use time::{Date, Month};

use crate::{
    AppState, Error,
    auth::UserId,
    category::{Category, CategoryId, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, PaginationIndicator, create_pagination_indicators, pagination_nav,
    },
    timezone::local_now,
    transaction::{
        core::Transaction,
        query::{TransactionFilter, get_transaction_page},
    },
};

const CONFIRM_DELETE_MESSAGE: &str =
    "Are you sure you want to delete this transaction? This cannot be undone.";

/// The query parameters accepted by the transactions page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TransactionsQuery {
    pub(crate) page: Option<u64>,
    pub(crate) category_id: Option<String>,
    pub(crate) date_from: Option<Date>,
    pub(crate) date_to: Option<Date>,
    pub(crate) search: Option<String>,
}

/// A transaction with the extra fields the table and cards need.
struct TransactionTableRow {
    transaction: Transaction,
    category_name: String,
    edit_url: String,
    delete_url: String,
}

impl TransactionTableRow {
    fn new(transaction: Transaction, category_names: &HashMap<CategoryId, String>) -> Self {
        let category_name = category_names
            .get(&transaction.category_id)
            .cloned()
            .unwrap_or_else(|| transaction.category_id.to_string());
        let edit_url =
            endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
        let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);

        Self {
            transaction,
            category_name,
            edit_url,
            delete_url,
        }
    }
}

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for reading transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
    /// The config that controls how to display pages of data.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Render an overview of the user's transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();
    let filter = build_filter(&query, today);
    let page_number = query.page.unwrap_or(state.pagination_config.default_page);

    let (page, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        let page = get_transaction_page(
            &user_id,
            &filter,
            page_number,
            state.pagination_config.default_page_size,
            &connection,
        )
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

        (page, categories)
    };

    let category_names: HashMap<CategoryId, String> = categories
        .iter()
        .map(|category| (category.id.clone(), category.name.to_string()))
        .collect();
    let rows: Vec<TransactionTableRow> = page
        .transactions
        .into_iter()
        .map(|transaction| TransactionTableRow::new(transaction, &category_names))
        .collect();
    let indicators = create_pagination_indicators(
        page_number,
        page.page_count,
        state.pagination_config.max_pages,
    );

    Ok(transactions_view(&rows, &categories, &filter, &indicators).into_response())
}

/// Turn the raw query params into a transaction filter.
///
/// Without an explicit date range the page shows the current calendar year.
fn build_filter(query: &TransactionsQuery, today: Date) -> TransactionFilter {
    let category_id = query
        .category_id
        .as_deref()
        .and_then(|raw_id| CategoryId::new(raw_id).ok());
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(ToOwned::to_owned);
    let (date_from, date_to) = match (query.date_from, query.date_to) {
        (None, None) => (
            Date::from_calendar_date(today.year(), Month::January, 1).ok(),
            Date::from_calendar_date(today.year(), Month::December, 31).ok(),
        ),
        explicit_range => explicit_range,
    };

    TransactionFilter {
        category_id,
        date_from,
        date_to,
        time_from: None,
        time_to: None,
        search,
    }
}

/// Build the URL for `page` of the transactions view, carrying the filter
/// query params so the filter survives page navigation.
fn build_page_url(filter: &TransactionFilter, page: u64) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();

    if let Some(category_id) = &filter.category_id {
        pairs.push(("category_id", category_id.to_string()));
    }

    if let Some(date_from) = filter.date_from {
        pairs.push(("date_from", date_from.to_string()));
    }

    if let Some(date_to) = filter.date_to {
        pairs.push(("date_to", date_to.to_string()));
    }

    if let Some(search) = &filter.search {
        pairs.push(("search", search.clone()));
    }

    pairs.push(("page", page.to_string()));

    match serde_urlencoded::to_string(&pairs) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::TRANSACTIONS_VIEW),
        Err(error) => {
            tracing::error!("Could not encode page URL query params: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

fn amount_cell(transaction: &Transaction) -> Markup {
    if transaction.is_expense {
        html!(
            span class="font-medium text-red-600 dark:text-red-400"
            {
                (format_currency(-transaction.amount))
            }
        )
    } else {
        html!(
            span class="font-medium text-green-600 dark:text-green-500"
            {
                (format_currency(transaction.amount))
            }
        )
    }
}

fn transactions_view(
    rows: &[TransactionTableRow],
    categories: &[Category],
    filter: &TransactionFilter,
    indicators: &[PaginationIndicator],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let search_value = filter.search.as_deref().unwrap_or_default();

    let table_row = |row: &TransactionTableRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(row.transaction.date) { (row.transaction.date) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.transaction.time)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (row.category_name) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.transaction.description)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (amount_cell(&row.transaction))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            CONFIRM_DELETE_MESSAGE,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "New Transaction"
                    }
                }

                (filter_form_view(categories, filter, search_value))

                (transactions_cards_view(rows))

                section class="hidden lg:block dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Time" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. Adjust the filters or "
                                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                        {
                                            "create one"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_nav(indicators, |page| build_page_url(filter, page)))
            }
        }
    );

    base("Transactions", &[], &content)
}

fn filter_form_view(categories: &[Category], filter: &TransactionFilter, search: &str) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full grid gap-4 rounded border border-gray-200 bg-white
                p-4 shadow-sm dark:border-gray-700 dark:bg-gray-800 md:grid-cols-5"
        {
            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="category_id"
                    id="category_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All categories" }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[filter.category_id.as_ref() == Some(&category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "From" }

                input
                    type="date"
                    name="date_from"
                    id="date_from"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=[filter.date_from];
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "To" }

                input
                    type="date"
                    name="date_to"
                    id="date_to"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=[filter.date_to];
            }

            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }

                input
                    type="text"
                    name="search"
                    id="search"
                    placeholder="Search descriptions"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(search);
            }

            div class="flex items-end"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
            }
        }
    )
}

fn transactions_cards_view(rows: &[TransactionTableRow]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4 w-full"
        {
            @for row in rows {
                li
                    data-transaction-card="true"
                    class="w-full rounded border border-gray-200 bg-white px-4 py-3
                        shadow-sm dark:border-gray-700 dark:bg-gray-800"
                {
                    div class="flex items-center justify-between"
                    {
                        time
                            datetime=(row.transaction.date)
                            class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (row.transaction.date) " " (row.transaction.time)
                        }

                        (amount_cell(&row.transaction))
                    }

                    div class="mt-2 flex items-center justify-between"
                    {
                        span class=(CATEGORY_BADGE_STYLE) { (row.category_name) }
                    }

                    @if !row.transaction.description.is_empty() {
                        p class="mt-2 text-sm" { (row.transaction.description) }
                    }

                    div class="mt-3 flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            CONFIRM_DELETE_MESSAGE,
                            "closest [data-transaction-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="text-center text-gray-500 dark:text-gray-400"
                {
                    "No transactions found."
                }
            }
        }
    )
}


#[cfg(test)]
mod transactions_view_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        category::{Category, CategoryId, CategoryName},
        pagination::create_pagination_indicators,
        test_utils::assert_valid_html,
        transaction::{TimeOfDay, Transaction, query::TransactionFilter},
    };

    use super::{TransactionTableRow, transactions_view};

    fn test_row(description: &str, amount: f64, is_expense: bool) -> TransactionTableRow {
        TransactionTableRow {
            transaction: Transaction {
                id: 1,
                date: date!(2025 - 10 - 05),
                time: TimeOfDay::new_unchecked("12:30"),
                category_id: CategoryId::new_unchecked("0712"),
                description: description.to_owned(),
                amount,
                is_expense,
            },
            category_name: "Groceries".to_owned(),
            edit_url: "/transactions/1/edit".to_owned(),
            delete_url: "/api/transactions/1".to_owned(),
        }
    }

    fn test_categories() -> Vec<Category> {
        vec![Category {
            id: CategoryId::new_unchecked("0712"),
            name: CategoryName::new_unchecked("Groceries"),
        }]
    }

    #[test]
    fn renders_transaction_rows() {
        let rows = [
            test_row("Weekly shop", 54.5, true),
            test_row("Refund", 12.0, false),
        ];

        let markup = transactions_view(
            &rows,
            &test_categories(),
            &TransactionFilter::default(),
            &[],
        );
        let html = Html::parse_document(&markup.into_string());

        assert_valid_html(&html);
        let table_text = html
            .select(&Selector::parse("table").unwrap())
            .next()
            .expect("No table found")
            .text()
            .collect::<String>();
        assert!(table_text.contains("Weekly shop"));
        assert!(table_text.contains("-$54.50"));
        assert!(table_text.contains("$12.00"));
        assert!(table_text.contains("Groceries"));
    }

    #[test]
    fn renders_empty_state() {
        let markup = transactions_view(
            &[],
            &test_categories(),
            &TransactionFilter::default(),
            &[],
        );
        let html = Html::parse_document(&markup.into_string());

        assert_valid_html(&html);
        let table_text = html
            .select(&Selector::parse("table").unwrap())
            .next()
            .expect("No table found")
            .text()
            .collect::<String>();
        assert!(table_text.contains("No transactions found"));
    }

    #[test]
    fn filter_form_preserves_values() {
        let filter = TransactionFilter {
            category_id: Some(CategoryId::new_unchecked("0712")),
            date_from: Some(date!(2025 - 01 - 01)),
            date_to: Some(date!(2025 - 12 - 31)),
            search: Some("lunch".to_owned()),
            ..Default::default()
        };

        let markup = transactions_view(&[], &test_categories(), &filter, &[]);
        let html = Html::parse_document(&markup.into_string());

        assert_valid_html(&html);
        let date_from = html
            .select(&Selector::parse("input[name='date_from']").unwrap())
            .next()
            .expect("No date_from input found");
        assert_eq!(date_from.value().attr("value"), Some("2025-01-01"));
        let search = html
            .select(&Selector::parse("input[name='search']").unwrap())
            .next()
            .expect("No search input found");
        assert_eq!(search.value().attr("value"), Some("lunch"));
        let selected_option = html
            .select(&Selector::parse("option[selected]").unwrap())
            .next()
            .expect("No selected category option found");
        assert_eq!(selected_option.value().attr("value"), Some("0712"));
    }

    #[test]
    fn renders_pagination_links_with_filter_params() {
        let filter = TransactionFilter {
            search: Some("lunch".to_owned()),
            ..Default::default()
        };
        let indicators = create_pagination_indicators(1, 3, 5);

        let markup = transactions_view(&[], &test_categories(), &filter, &indicators);
        let html = Html::parse_document(&markup.into_string());

        assert_valid_html(&html);
        let page_link = html
            .select(&Selector::parse("nav.pagination a").unwrap())
            .find(|link| link.text().collect::<String>().trim() == "2")
            .expect("No link to page 2 found");
        assert_eq!(
            page_link.value().attr("href"),
            Some("/transactions?search=lunch&page=2")
        );
    }
}
