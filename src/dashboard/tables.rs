//! Recent activity tables for the dashboard.
//!
//! Shows the user's most recent transactions and revenue entries so the last
//! few records are visible without leaving the dashboard.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::{
    category::CategoryId,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
    revenue::Revenue,
    transaction::Transaction,
};

const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Renders a table of the most recent transactions.
///
/// Renders nothing when there are no transactions to show.
///
/// # Arguments
/// * `transactions` - The transactions to display, most recent first
/// * `category_names` - Maps category IDs to their display names
///
/// # Returns
/// Maud markup containing the recent transactions table.
pub(super) fn recent_transactions_table(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    if transactions.is_empty() {
        return html! {};
    }

    html! {
        div {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }
                    tbody {
                        @for transaction in transactions {
                            @let category_name = category_names
                                .get(&transaction.category_id)
                                .cloned()
                                .unwrap_or_else(|| transaction.category_id.to_string());

                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) {
                                    time datetime=(transaction.date) { (transaction.date) }
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    span class=(CATEGORY_BADGE_STYLE) { (category_name) }
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    (transaction.description)
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    @if transaction.is_expense {
                                        span class={"font-medium " (TABLE_CELL_RED_STYLE)} {
                                            (format_currency(-transaction.amount))
                                        }
                                    } @else {
                                        span class={"font-medium " (TABLE_CELL_GREEN_STYLE)} {
                                            (format_currency(transaction.amount))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders a table of the most recent revenue entries.
///
/// Renders nothing when there are no revenue entries to show.
///
/// # Arguments
/// * `revenues` - The revenue entries to display, most recent first
///
/// # Returns
/// Maud markup containing the recent revenues table.
pub(super) fn recent_revenues_table(revenues: &[Revenue]) -> Markup {
    if revenues.is_empty() {
        return html! {};
    }

    html! {
        div {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" { "Recent Revenues" }
                a href=(endpoints::REVENUES_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }
                    tbody {
                        @for revenue in revenues {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) {
                                    time datetime=(revenue.date) { (revenue.date) }
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    span class=(CATEGORY_BADGE_STYLE) { (revenue.revenue_type) }
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    (revenue.description)
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    span class={"font-medium " (TABLE_CELL_GREEN_STYLE)} {
                                        (format_currency(revenue.amount))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
