//! Defines the endpoint for recording a new revenue entry.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    endpoints,
    revenue::core::{Revenue, RevenueType, create_revenue},
    timezone::local_now,
};

/// The state needed to record a revenue entry.
#[derive(Debug, Clone)]
pub struct CreateRevenueState {
    /// The database connection for managing revenue entries.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for CreateRevenueState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating or updating a revenue entry.
#[derive(Debug, Deserialize)]
pub struct RevenueForm {
    /// The value of the revenue entry in dollars.
    pub amount: f64,
    /// The date when the revenue was received.
    pub date: Date,
    /// The label of the revenue type, e.g. "Salary".
    pub revenue_type: String,
    /// Text detailing the revenue entry.
    pub description: String,
}

/// A route handler for recording a new revenue entry, redirects to the
/// revenues view on success.
pub async fn create_revenue_endpoint(
    State(state): State<CreateRevenueState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<RevenueForm>,
) -> Response {
    let now_local_time = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > now_local_time.date() {
        tracing::error!(
            "Tried to perform an operation with a future date (e.g., record a revenue entry)"
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

    if let Err(error) = create_revenue(builder, &user_id, &connection) {
        tracing::error!("could not create revenue entry: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::REVENUES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
