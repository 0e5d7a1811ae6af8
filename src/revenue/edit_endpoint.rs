//! Defines the endpoint for updating an existing revenue entry.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    db::DatabaseId,
    endpoints,
    revenue::{
        core::{Revenue, RevenueType, update_revenue},
        create_endpoint::RevenueForm,
    },
    timezone::local_now,
};

/// The state needed to update a revenue entry.
#[derive(Debug, Clone)]
pub struct UpdateRevenueState {
    /// The database connection for managing revenue entries.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for UpdateRevenueState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for updating a revenue entry, redirects to the revenues
/// view on success.
pub async fn update_revenue_endpoint(
    State(state): State<UpdateRevenueState>,
    Extension(user_id): Extension<UserId>,
    Path(revenue_id): Path<DatabaseId>,
    Form(form): Form<RevenueForm>,
) -> Response {
    let now_local_time = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > now_local_time.date() {
        tracing::error!(
            "Tried to perform an operation with a future date (e.g., update a revenue entry)"
        );

        return Error::FutureDate(form.date).into_alert_response();
    }

    let revenue_type = match form.revenue_type.parse::<RevenueType>() {
        Ok(revenue_type) => revenue_type,
        Err(error) => return error.into_alert_response(),
    };

    let builder = Revenue::build(form.amount, form.date, revenue_type, &form.description);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_revenue(revenue_id, &user_id, builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::REVENUES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingRevenue | Error::Forbidden)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating revenue entry {revenue_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
