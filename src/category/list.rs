//! Categories listing page.
//!
//! Categories are shared across users, so this page shows every category
//! along with how many transactions use it. The creation form is embedded at
//! the top of the page instead of living on its own page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, create::new_category_form_view, get_all_categories},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

const CARD_STYLE: &str = "rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800";

const EMPTY_LIST_MESSAGE: &str = "No categories created yet. Add one using the form above.";

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category plus everything the table and card views render for it.
#[derive(Debug, Clone)]
struct CategoryRow {
    category: Category,
    transaction_count: u32,
    edit_url: String,
    delete_url: String,
    confirm_message: String,
}

impl CategoryRow {
    fn new(category: Category, transaction_count: u32) -> Self {
        Self {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, &category.id),
            delete_url: endpoints::format_endpoint(endpoints::CATEGORY, &category.id),
            confirm_message: format!(
                "Are you sure you want to delete '{}'? This cannot be undone.",
                category.name
            ),
            transaction_count,
            category,
        }
    }
}

/// Render the categories listing page with transaction counts.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transaction_counts = count_transactions_per_category(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per category: {error}"),
    )?;

    let rows: Vec<CategoryRow> = categories
        .into_iter()
        .map(|category| {
            let transaction_count = transaction_counts.get(&category.id).copied().unwrap_or(0);

            CategoryRow::new(category, transaction_count)
        })
        .collect();

    Ok(categories_view(&rows).into_response())
}

fn count_transactions_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    connection
        .prepare("SELECT category_id, COUNT(1) FROM \"transaction\" GROUP BY category_id")?
        .query_map((), |row| {
            let category_id: String = row.get(0)?;
            let count = row.get(1)?;

            Ok((CategoryId::new_unchecked(&category_id), count))
        })?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(Error::from)
}

fn categories_view(rows: &[CategoryRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }
                }

                section class={ "w-full max-w-md " (CARD_STYLE) }
                {
                    h2 class="mb-4 text-lg font-semibold" { "Create Category" }

                    (new_category_form_view("", "", ""))
                }

                (categories_cards_view(rows))
                (categories_table_view(rows))
            }
        }
    );

    base("Categories", &[], &content)
}

/// The table on wide screens. Hidden on small screens in favor of the cards.
fn categories_table_view(rows: &[CategoryRow]) -> Markup {
    html!(
        section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
        {
            table class="w-full text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for column in ["ID", "Name", "Transactions", "Actions"] {
                            th scope="col" class=(TABLE_CELL_STYLE)
                            {
                                (column)
                            }
                        }
                    }
                }

                tbody
                {
                    @for row in rows {
                        (category_table_row(row))
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center
                                    text-gray-500 dark:text-gray-400"
                            {
                                (EMPTY_LIST_MESSAGE)
                            }
                        }
                    }
                }
            }
        }
    )
}

fn category_table_row(row: &CategoryRow) -> Markup {
    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (row.category.id)
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (row.category.name)
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (row.transaction_count)
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &row.confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    )
}

/// The card list on small screens. Hidden on wide screens in favor of the table.
fn categories_cards_view(rows: &[CategoryRow]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in rows {
                li class=(CARD_STYLE)
                    data-category-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        span
                        {
                            span class="mr-2 text-sm font-mono text-gray-500 dark:text-gray-400"
                            { (row.category.id) }
                            span class=(CATEGORY_BADGE_STYLE) { (row.category.name) }
                        }
                        span class="text-sm tabular-nums text-gray-900 dark:text-white"
                        { (row.transaction_count) }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &row.confirm_message,
                            "closest [data-category-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    (EMPTY_LIST_MESSAGE)
                }
            }
        }
    )
}
