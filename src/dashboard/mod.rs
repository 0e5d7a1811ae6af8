//! The dashboard page, which summarises the user's finances for the current
//! calendar month.
//!
//! Shows month-to-date stat cards, expense and revenue breakdown charts, and
//! the most recently recorded transactions and revenue entries.

mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::{DashboardState, get_dashboard_page};
