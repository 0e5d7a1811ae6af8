//! The URIs for every page and API route.
//!
//! Routes with a parameter, e.g. '/categories/{category_id}/edit', are
//! formatted with [format_endpoint].

use std::fmt::Display;

/// The root route, which redirects to the dashboard or the log-in page.
pub const ROOT: &str = "/";
/// The landing page for logged-in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing all categories and creating new ones.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page listing the user's revenue entries.
pub const REVENUES_VIEW: &str = "/revenues";
/// The page for creating a new revenue entry.
pub const NEW_REVENUE_VIEW: &str = "/revenues/new";
/// The page for editing an existing revenue entry.
pub const EDIT_REVENUE_VIEW: &str = "/revenues/{revenue_id}/edit";
/// The main reports page with breakdowns and trends.
pub const REPORTS_VIEW: &str = "/reports";
/// The report for a single category over its full history.
pub const CATEGORY_REPORT_VIEW: &str = "/reports/category";
/// The report for transactions within a date range.
pub const DATE_REPORT_VIEW: &str = "/reports/date";
/// The report for transactions within a time of day range.
pub const TIME_REPORT_VIEW: &str = "/reports/time";
/// The route for downloading an expense report file.
pub const EXPORT_REPORT: &str = "/reports/export/{report_type}/{format}";
/// The account registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The log-in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page for requesting a password reset email.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page for setting a new password from an emailed reset link.
pub const RESET_PASSWORD_VIEW: &str = "/reset_password/{token}";
/// The page shown when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The prefix for static files.
pub const STATIC: &str = "/static";

/// The endpoint behind the log-in form.
pub const LOG_IN_API: &str = "/api/log_in";
/// The endpoint that logs out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The endpoint behind the registration form.
pub const USERS: &str = "/api/users";
/// The endpoint that sends a password reset email.
pub const FORGOT_PASSWORD_API: &str = "/api/forgot_password";
/// The endpoint that sets a new password with a reset token.
pub const RESET_PASSWORD_API: &str = "/api/reset_password/{token}";
/// The endpoint that creates a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The endpoint that updates or deletes a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The endpoint that creates a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The endpoint that updates or deletes a transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The endpoint that creates a revenue entry.
pub const REVENUES_API: &str = "/api/revenues";
/// The endpoint that updates or deletes a revenue entry.
pub const REVENUE: &str = "/api/revenues/{revenue_id}";

/// Replace the brace-delimited parameter in `endpoint_path` with `id`.
///
/// Paths are assumed to hold at most one parameter. A path without a
/// parameter is returned unchanged. An unclosed brace swallows the rest of
/// the path.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[test]
    fn endpoints_are_valid_uris() {
        let all_endpoints = [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::EDIT_TRANSACTION_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::REVENUES_VIEW,
            endpoints::NEW_REVENUE_VIEW,
            endpoints::EDIT_REVENUE_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::CATEGORY_REPORT_VIEW,
            endpoints::DATE_REPORT_VIEW,
            endpoints::TIME_REPORT_VIEW,
            endpoints::EXPORT_REPORT,
            endpoints::REGISTER_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::FORGOT_PASSWORD_VIEW,
            endpoints::RESET_PASSWORD_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
            endpoints::LOG_IN_API,
            endpoints::LOG_OUT,
            endpoints::USERS,
            endpoints::FORGOT_PASSWORD_API,
            endpoints::RESET_PASSWORD_API,
            endpoints::CATEGORIES_API,
            endpoints::CATEGORY,
            endpoints::TRANSACTIONS_API,
            endpoints::TRANSACTION,
            endpoints::REVENUES_API,
            endpoints::REVENUE,
        ];

        for endpoint in all_endpoints {
            assert!(
                endpoint.parse::<Uri>().is_ok(),
                "{endpoint} is not a valid URI"
            );
        }
    }

    #[test]
    fn replaces_named_parameter() {
        assert_eq!(format_endpoint("/hello/{world_id}", 1), "/hello/1");
        assert_eq!(format_endpoint("/hello/{world}", 1), "/hello/1");
    }

    #[test]
    fn formats_string_parameters() {
        let formatted_path = format_endpoint(endpoints::CATEGORY, "0712");

        assert_eq!(formatted_path, "/api/categories/0712");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(format_endpoint("/hello/world", 1), "/hello/world");
    }

    #[test]
    fn replaces_parameter_in_the_middle_of_the_path() {
        assert_eq!(format_endpoint("/hello/{world}/bye", 1), "/hello/1/bye");
    }
}
