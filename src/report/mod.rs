//! Reporting pages for the finance tracker.
//!
//! This module contains:
//! - The reports overview page with totals, breakdowns and a daily trend chart
//! - Drill-down reports that slice spending by category, date range or time of
//!   day
//! - The endpoint for downloading the transaction history as a CSV, Excel or
//!   PDF file

mod category_page;
mod charts;
mod components;
mod date_page;
mod export_endpoint;
mod overview_page;
mod time_page;

pub use category_page::get_category_report_page;
pub use date_page::get_date_report_page;
pub use export_endpoint::export_report_endpoint;
pub use overview_page::get_reports_page;
pub use time_page::get_time_report_page;
