//! Defines the route handler for the page for editing a revenue entry.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    db::DatabaseId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, form_submit_button},
    navigation::NavBar,
    revenue::{
        core::{Revenue, get_revenue},
        form::{RevenueFormDefaults, revenue_form_fields},
    },
    timezone::local_now,
};

/// The state needed for the edit revenue page.
#[derive(Debug, Clone)]
pub struct EditRevenuePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
    /// The database connection for accessing revenue entries.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditRevenuePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a revenue entry.
///
/// Responds with the not found page if the revenue entry does not exist, and
/// the access denied page if it belongs to another user.
pub async fn get_edit_revenue_page(
    State(state): State<EditRevenuePageState>,
    Extension(user_id): Extension<UserId>,
    Path(revenue_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let revenue = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_revenue(revenue_id, &user_id, &connection) {
            Ok(revenue) => revenue,
            Err(error @ (Error::NotFound | Error::Forbidden)) => return Err(error),
            Err(error) => {
                tracing::error!("Failed to retrieve revenue entry {revenue_id}: {error}");
                return Err(error);
            }
        }
    };

    let max_date = local_now(&state.local_timezone)?.date();

    Ok(edit_revenue_view(max_date, &revenue).into_response())
}

fn edit_revenue_view(max_date: Date, revenue: &Revenue) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_REVENUE_VIEW, revenue.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::REVENUE, revenue.id);
    let defaults = RevenueFormDefaults {
        amount: Some(revenue.amount),
        date: revenue.date,
        revenue_type: Some(revenue.revenue_type),
        description: Some(revenue.description.as_str()),
        max_date,
    };

    let content = html! {
        (NavBar::new(&edit_endpoint).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Revenue" }

                (revenue_form_fields(&defaults))

                (form_submit_button("Update Revenue"))
            }
        }
    };

    base("Edit Revenue", &[dollar_input_styles()], &content)
}
