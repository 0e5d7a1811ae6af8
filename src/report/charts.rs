//! Chart generation for the report pages.
//!
//! The overview page charts daily expense and revenue totals over the selected
//! date range. The drill-down reports chart their matched transactions per day
//! or per hour of the day.

use std::collections::BTreeMap;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Line, bar},
};
use time::Date;

use crate::charts::currency_formatter;

/// Creates the line chart of daily expense and revenue totals for the
/// overview page.
///
/// Both series must cover the same date range with one entry per day, so the
/// expense series provides the axis labels for both.
pub(super) fn daily_trend_chart(
    expense_totals: &[(Date, f64)],
    revenue_totals: &[(Date, f64)],
) -> Chart {
    let labels: Vec<String> = expense_totals
        .iter()
        .map(|(date, _)| date.to_string())
        .collect();
    let expense_values: Vec<f64> = expense_totals.iter().map(|(_, total)| *total).collect();
    let revenue_values: Vec<f64> = revenue_totals.iter().map(|(_, total)| *total).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Daily Totals")
                .subtext("Expenses and revenue per day")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(chart_grid().top(90))
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis())
        .series(Line::new().name("Expenses").data(expense_values))
        .series(Line::new().name("Revenue").data(revenue_values))
}

/// Creates a line chart of the daily spending totals for a drill-down report.
///
/// Days with no matched transactions are left out rather than plotted as
/// zero.
pub(super) fn daily_spending_chart(subtext: &str, totals: &BTreeMap<Date, f64>) -> Chart {
    let labels: Vec<String> = totals.keys().map(Date::to_string).collect();
    let values: Vec<f64> = totals.values().copied().collect();

    Chart::new()
        .title(Title::new().text("Daily Spending").subtext(subtext))
        .tooltip(currency_tooltip())
        .grid(chart_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis())
        .series(Line::new().name("Spending").data(values))
}

/// Creates a bar chart of spending totals keyed by hour of the day.
pub(super) fn hourly_spending_chart(subtext: &str, totals: &BTreeMap<String, f64>) -> Chart {
    let labels: Vec<String> = totals.keys().cloned().collect();
    let values: Vec<f64> = totals.values().copied().collect();

    Chart::new()
        .title(Title::new().text("Spending by Hour").subtext(subtext))
        .tooltip(currency_tooltip())
        .grid(chart_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis())
        .series(bar::Bar::new().name("Spending").data(values))
}

fn chart_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn currency_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter()))
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
