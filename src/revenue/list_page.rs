//! Render the page for browsing a user's revenue entries.

use std::sync::{Arc, Mutex};

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

use crate::{
    AppState, Error,
    auth::UserId,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, PaginationIndicator, create_pagination_indicators, pagination_nav,
    },
    revenue::query::{RevenuePage, get_revenue_page},
};

const CONFIRM_DELETE_MESSAGE: &str =
    "Are you sure you want to delete this revenue entry? This cannot be undone.";

/// The query parameters accepted by the revenues page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RevenuesQuery {
    pub(crate) page: Option<u64>,
}

/// The state needed for the revenues page.
#[derive(Debug, Clone)]
pub struct RevenuesViewState {
    /// The database connection for reading revenue entries.
    db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for RevenuesViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Render an overview of the user's revenue entries with the all-time total.
pub async fn get_revenues_page(
    State(state): State<RevenuesViewState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<RevenuesQuery>,
) -> Result<Response, Error> {
    let page_number = query.page.unwrap_or(state.pagination_config.default_page);

    let page = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_revenue_page(
            &user_id,
            page_number,
            state.pagination_config.default_page_size,
            &connection,
        )
        .inspect_err(|error| tracing::error!("could not get revenue entries: {error}"))?
    };

    let indicators = create_pagination_indicators(
        page_number,
        page.page_count,
        state.pagination_config.max_pages,
    );

    Ok(revenues_view(&page, &indicators).into_response())
}

fn page_url(page: u64) -> String {
    format!("{}?page={page}", endpoints::REVENUES_VIEW)
}

fn revenues_view(page: &RevenuePage, indicators: &[PaginationIndicator]) -> Markup {
    let nav_bar = NavBar::new(endpoints::REVENUES_VIEW).into_html();

    let amount_cell = |amount: f64| {
        html!(
            span class="font-medium text-green-600 dark:text-green-500"
            {
                (format_currency(amount))
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
                    h1 class="text-xl font-bold" { "Revenues" }

                    a href=(endpoints::NEW_REVENUE_VIEW) class=(LINK_STYLE)
                    {
                        "New Revenue"
                    }
                }

                div class="w-full max-w-xs rounded border border-gray-200 bg-white px-4 py-3
                    shadow-sm dark:border-gray-700 dark:bg-gray-800"
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "All-time total" }

                    p class="text-2xl font-semibold text-green-600 dark:text-green-500"
                    {
                        (format_currency(page.total))
                    }
                }

                ul class="lg:hidden space-y-4 w-full"
                {
                    @for revenue in &page.revenues {
                        li
                            data-revenue-card="true"
                            class="w-full rounded border border-gray-200 bg-white px-4 py-3
                                shadow-sm dark:border-gray-700 dark:bg-gray-800"
                        {
                            div class="flex items-center justify-between"
                            {
                                time
                                    datetime=(revenue.date)
                                    class="text-sm text-gray-500 dark:text-gray-400"
                                {
                                    (revenue.date)
                                }

                                (amount_cell(revenue.amount))
                            }

                            div class="mt-2 flex items-center justify-between"
                            {
                                span class=(CATEGORY_BADGE_STYLE) { (revenue.revenue_type) }
                            }

                            @if !revenue.description.is_empty() {
                                p class="mt-2 text-sm" { (revenue.description) }
                            }

                            div class="mt-3 flex gap-4"
                            {
                                (edit_delete_action_links(
                                    &endpoints::format_endpoint(
                                        endpoints::EDIT_REVENUE_VIEW,
                                        revenue.id,
                                    ),
                                    &endpoints::format_endpoint(endpoints::REVENUE, revenue.id),
                                    CONFIRM_DELETE_MESSAGE,
                                    "closest [data-revenue-card='true']",
                                    "outerHTML",
                                ))
                            }
                        }
                    }

                    @if page.revenues.is_empty() {
                        li class="text-center text-gray-500 dark:text-gray-400"
                        {
                            "No revenue entries found."
                        }
                    }
                }

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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for revenue in &page.revenues {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        time datetime=(revenue.date) { (revenue.date) }
                                    }

                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        span class=(CATEGORY_BADGE_STYLE) { (revenue.revenue_type) }
                                    }

                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (revenue.description)
                                    }

                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (amount_cell(revenue.amount))
                                    }

                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        div class="flex gap-4"
                                        {
                                            (edit_delete_action_links(
                                                &endpoints::format_endpoint(
                                                    endpoints::EDIT_REVENUE_VIEW,
                                                    revenue.id,
                                                ),
                                                &endpoints::format_endpoint(
                                                    endpoints::REVENUE,
                                                    revenue.id,
                                                ),
                                                CONFIRM_DELETE_MESSAGE,
                                                "closest tr",
                                                "delete",
                                            ))
                                        }
                                    }
                                }
                            }

                            @if page.revenues.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No revenue entries found. "
                                        a href=(endpoints::NEW_REVENUE_VIEW) class=(LINK_STYLE)
                                        {
                                            "Record one"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_nav(indicators, page_url))
            }
        }
    );

    base("Revenues", &[], &content)
}
