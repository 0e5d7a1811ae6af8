//! Wires every page and API endpoint to its handler.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, get_reset_password_page, post_forgot_password, post_log_in,
        post_reset_password, register_user,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{
        export_report_endpoint, get_category_report_page, get_date_report_page, get_reports_page,
        get_time_report_page,
    },
    revenue::{
        create_revenue_endpoint, delete_revenue_endpoint, get_create_revenue_page,
        get_edit_revenue_page, get_revenues_page, update_revenue_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_create_transaction_page,
        get_edit_transaction_page, get_transactions_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(page_routes(&state))
        .merge(api_routes(&state))
        .merge(public_routes())
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The HTML pages behind the auth guard. Browsers navigate here directly, so
/// the guard redirects to the log-in page with a Location header.
fn page_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::REVENUES_VIEW, get(get_revenues_page))
        .route(endpoints::NEW_REVENUE_VIEW, get(get_create_revenue_page))
        .route(endpoints::EDIT_REVENUE_VIEW, get(get_edit_revenue_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(
            endpoints::CATEGORY_REPORT_VIEW,
            get(get_category_report_page),
        )
        .route(endpoints::DATE_REPORT_VIEW, get(get_date_report_page))
        .route(endpoints::TIME_REPORT_VIEW, get(get_time_report_page))
        .route(endpoints::EXPORT_REPORT, get(export_report_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
}

/// The form endpoints behind the auth guard. htmx submits to these with
/// XMLHttpRequest, so auth redirects must use the HX-Redirect header instead
/// of a Location header.
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::REVENUES_API, post(create_revenue_endpoint))
        .route(
            endpoints::REVENUE,
            put(update_revenue_endpoint).delete(delete_revenue_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx))
}

/// The routes that work without an auth cookie: the log-in, registration and
/// password reset flows, and the error page.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::FORGOT_PASSWORD_API, post(post_forgot_password))
        .route(endpoints::RESET_PASSWORD_VIEW, get(get_reset_password_page))
        .route(endpoints::RESET_PASSWORD_API, post(post_reset_password))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}
