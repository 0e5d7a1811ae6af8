//! Revenue management for the finance tracker.
//!
//! This module contains everything related to revenue entries:
//! - The `Revenue` model, its fixed set of revenue types and the builder for
//!   creating entries
//! - Database functions for storing, querying, and summarising revenue
//! - View handlers for revenue-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod list_page;
mod query;

pub use self::core::{
    MAX_DESCRIPTION_LENGTH, Revenue, RevenueBuilder, RevenueType, create_revenue,
    create_revenue_table, delete_revenue, get_revenue, update_revenue,
};
pub use create_endpoint::create_revenue_endpoint;
pub use create_page::get_create_revenue_page;
pub use delete_endpoint::delete_revenue_endpoint;
pub use edit_endpoint::update_revenue_endpoint;
pub use edit_page::get_edit_revenue_page;
pub use list_page::get_revenues_page;
pub use query::{RevenuePage, get_revenue_page, get_revenues, sum_by_day, sum_by_type};
