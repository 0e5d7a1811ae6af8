//! Stat cards summarising the current calendar month.
//!
//! Provides card-based summaries showing:
//! - Month-to-date spending with a progress bar tracking budget use
//! - Month-to-date revenue compared against expected income
//! - The user's monthly budget and expected monthly income

use maud::{Markup, html};

use crate::{html::format_currency, transaction::percent_of};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
     dark:border-gray-700 rounded-lg p-4 shadow-md";

const MUTED_TEXT_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";

/// Month-to-date totals shown in the dashboard stat cards.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct MonthToDate {
    /// Total spent so far this calendar month.
    pub expense_total: f64,
    /// Total earned so far this calendar month.
    pub revenue_total: f64,
    /// The user's monthly spending limit.
    pub budget: f64,
    /// The income the user expects each month.
    pub monthly_income: f64,
}

/// Round a percentage for display, mapping negative zero to "0".
fn format_percentage(value: f64) -> String {
    let rounded = value.round();

    if rounded == 0.0 {
        return "0".to_string();
    }

    format!("{rounded:.0}")
}

/// Renders the month-to-date stat cards section.
///
/// Shows spending against budget, revenue against expected income, and the
/// user's configured budget and income.
///
/// # Arguments
/// * `month` - The month-to-date totals to display
///
/// # Returns
/// Maud markup containing the stat cards section.
pub(super) fn stat_cards_view(month: &MonthToDate) -> Markup {
    let budget_used = percent_of(month.expense_total, month.budget);
    let income_earned = percent_of(month.revenue_total, month.monthly_income);

    let spending_detail = html! {
        (progress_bar(budget_used as f64))
        div class=(MUTED_TEXT_STYLE) { (budget_used) "% of budget" }
    };
    let revenue_detail = html! {
        div class=(MUTED_TEXT_STYLE) { (income_earned) "% of expected income" }
    };

    html! {
        section id="stat-cards" class="w-full mx-auto mb-4" {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" { "This Month" }
                span class=(MUTED_TEXT_STYLE) { "Month to date" }
            }

            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                (stat_card(
                    "Spent this month",
                    month.expense_total,
                    "text-red-600 dark:text-red-400",
                    spending_detail,
                ))
                (stat_card(
                    "Earned this month",
                    month.revenue_total,
                    "text-green-600 dark:text-green-400",
                    revenue_detail,
                ))
                (stat_card("Monthly budget", month.budget, "", html! {}))
                (stat_card("Monthly income", month.monthly_income, "", html! {}))
            }
        }
    }
}

/// One card in the grid: a label, a large currency amount and optional detail
/// content below the amount.
fn stat_card(label: &str, amount: f64, amount_style: &str, detail: Markup) -> Markup {
    html! {
        div class=(CARD_STYLE) {
            div class={ (MUTED_TEXT_STYLE) " mb-1" } { (label) }
            div class={ "text-3xl font-bold mb-2 " (amount_style) } {
                (format_currency(amount))
            }
            (detail)
        }
    }
}

/// A horizontal bar showing how much of the monthly budget is spent.
fn progress_bar(percentage: f64) -> Markup {
    let clamped = percentage.clamp(0.0, 100.0);

    html! {
        div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5 mb-2"
            role="progressbar"
            aria-valuenow=(format_percentage(clamped))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if clamped > 0.0 {
                // Widths under 3% would hide behind the bar's rounded corners.
                div class="bg-blue-600 dark:bg-blue-500 h-2.5 rounded-full transition-all"
                    style=(format!("width: {:.1}%", clamped.max(3.0))) {}
            }
        }
    }
}
