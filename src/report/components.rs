//! Shared building blocks for the report pages.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::{
    category::CategoryId,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
    transaction::Transaction,
};

const SUMMARY_CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
     dark:border-gray-700 rounded-lg p-4 shadow-md";

/// Renders a row of labelled stat cards summarising a report.
pub(super) fn summary_cards(cards: &[(&str, String)]) -> Markup {
    html!(
        section
            id="report-summary"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
            {
                @for (label, value) in cards {
                    div class=(SUMMARY_CARD_STYLE)
                    {
                        div class="text-sm text-gray-500 dark:text-gray-400 mb-1"
                        {
                            (label)
                        }

                        div class="text-3xl font-bold mb-2"
                        {
                            (value)
                        }
                    }
                }
            }
        }
    )
}

/// Renders the expense transactions matched by a drill-down report as a table.
pub(super) fn matched_transactions_table(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    html!(
        section class="w-full mx-auto mb-4"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Matched Transactions" }

                span class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (transactions.len()) " entries"
                }
            }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
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
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            @let category_name = category_names
                                .get(&transaction.category_id)
                                .cloned()
                                .unwrap_or_else(|| transaction.category_id.to_string());

                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    time datetime=(transaction.date) { (transaction.date) }
                                }

                                td class=(TABLE_CELL_STYLE) { (transaction.time) }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    span class=(CATEGORY_BADGE_STYLE) { (category_name) }
                                }

                                td class=(TABLE_CELL_STYLE) { (transaction.description) }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    span class="font-medium text-red-600 dark:text-red-400"
                                    {
                                        (format_currency(-transaction.amount))
                                    }
                                }
                            }
                        }

                        @if transactions.is_empty() {
                            tr
                            {
                                td
                                    colspan="5"
                                    class="px-6 py-4 text-center
                                        text-gray-500 dark:text-gray-400"
                                {
                                    "No transactions matched this report."
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

/// Renders the link back to the reports overview page.
pub(super) fn back_to_reports_link() -> Markup {
    html!(
        a href=(endpoints::REPORTS_VIEW) class=(LINK_STYLE) { "Back to Reports" }
    )
}

#[cfg(test)]
mod report_components_tests {
    use std::collections::HashMap;

    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        category::CategoryId,
        test_utils::assert_valid_html,
        transaction::{TimeOfDay, Transaction},
    };

    use super::{matched_transactions_table, summary_cards};

    fn test_transaction(description: &str, amount: f64) -> Transaction {
        Transaction {
            id: 1,
            date: date!(2025 - 03 - 01),
            time: TimeOfDay::new_unchecked("12:30"),
            category_id: CategoryId::new_unchecked("0712"),
            description: description.to_owned(),
            amount,
            is_expense: true,
        }
    }

    fn test_category_names() -> HashMap<CategoryId, String> {
        HashMap::from([(CategoryId::new_unchecked("0712"), "Groceries".to_owned())])
    }

    #[test]
    fn summary_cards_render_labels_and_values() {
        let cards = [
            ("Transactions", "2".to_owned()),
            ("Total Spent", "$80.00".to_owned()),
            ("Average per Transaction", "$40.00".to_owned()),
        ];

        let markup = summary_cards(&cards);
        let html = Html::parse_fragment(&markup.into_string());

        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        for (label, value) in &cards {
            assert!(text.contains(label), "missing card label {label}");
            assert!(text.contains(value), "missing card value {value}");
        }
    }

    #[test]
    fn table_renders_matched_transactions() {
        let transactions = [test_transaction("Weekly shop", 54.5)];

        let markup = matched_transactions_table(&transactions, &test_category_names());
        let html = Html::parse_fragment(&markup.into_string());

        assert_valid_html(&html);
        let table_text = html
            .select(&Selector::parse("table").unwrap())
            .next()
            .expect("No table found")
            .text()
            .collect::<String>();
        assert!(table_text.contains("Weekly shop"));
        assert!(table_text.contains("Groceries"));
        assert!(table_text.contains("-$54.50"));
    }

    #[test]
    fn table_falls_back_to_category_id_for_unknown_category() {
        let transactions = [test_transaction("Mystery", 9.0)];

        let markup = matched_transactions_table(&transactions, &HashMap::new());
        let html = Html::parse_fragment(&markup.into_string());

        let table_text = html.root_element().text().collect::<String>();
        assert!(table_text.contains("0712"));
    }

    #[test]
    fn table_shows_empty_state() {
        let markup = matched_transactions_table(&[], &test_category_names());
        let html = Html::parse_fragment(&markup.into_string());

        assert_valid_html(&html);
        let table_text = html.root_element().text().collect::<String>();
        assert!(table_text.contains("No transactions matched this report."));
    }
}
