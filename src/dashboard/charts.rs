//! Chart generation for the dashboard.
//!
//! The dashboard shows two ECharts pie charts for the current month:
//! - **Expenses by Category**: month-to-date spending per category
//! - **Revenue by Type**: month-to-date revenue per revenue type

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Tooltip, Trigger},
    series::Pie,
};

use crate::charts::currency_formatter;

/// Creates the month-to-date expense breakdown pie chart.
///
/// `totals` pairs each category name with its spending, largest first.
pub(super) fn expense_breakdown_chart(totals: &[(String, f64)]) -> Chart {
    breakdown_chart("Expenses by Category", "Expenses", totals)
}

/// Creates the month-to-date revenue breakdown pie chart.
///
/// `totals` pairs each revenue type label with its total, largest first.
pub(super) fn revenue_breakdown_chart(totals: &[(String, f64)]) -> Chart {
    breakdown_chart("Revenue by Type", "Revenue", totals)
}

fn breakdown_chart(title: &str, series_name: &str, totals: &[(String, f64)]) -> Chart {
    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|(name, amount)| (*amount, name.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text(title).subtext("This month"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name(series_name).radius("55%").data(data))
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Item)
        .value_formatter(currency_formatter())
}
