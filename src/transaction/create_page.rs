//! Defines the route handler for the new transaction page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, form_submit_button},
    navigation::NavBar,
    timezone::local_now,
    transaction::{
        TransactionKind,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

fn create_transaction_view(max_date: Date, current_time: &str, categories: &[Category]) -> Markup {
    let defaults = TransactionFormDefaults {
        kind: TransactionKind::Expense,
        amount: None,
        date: max_date,
        time: current_time,
        description: None,
        category_id: None,
        max_date,
    };

    let content = html! {
        (NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (transaction_form_fields(&defaults, categories))

                (form_submit_button("Create Transaction"))
            }
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
    /// The database connection for accessing categories.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the form for entering a new transaction.
///
/// The date and time inputs are prefilled with the current local date and
/// time, and the date input is capped at today.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new transaction page: {error}")
        })?
    };

    let now = local_now(&state.local_timezone)?;
    let max_date = now.date();
    let current_time = format!("{:02}:{:02}", now.hour(), now.minute());

    Ok(create_transaction_view(max_date, &current_time, &categories).into_response())
}
