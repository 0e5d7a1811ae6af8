//! Defines the route handler for the page for editing a transaction.

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
    category::{Category, get_all_categories},
    db::DatabaseId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, form_submit_button},
    navigation::NavBar,
    timezone::local_now,
    transaction::{
        Transaction, TransactionKind,
        form::{TransactionFormDefaults, transaction_form_fields},
        get_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
    /// The database connection for accessing transactions and categories.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
///
/// Responds with the not found page if the transaction does not exist or
/// belongs to another user.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let (transaction, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = match get_transaction(transaction_id, &user_id, &connection) {
            Ok(transaction) => transaction,
            Err(Error::NotFound) => return Err(Error::NotFound),
            Err(error) => {
                tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
                return Err(error);
            }
        };
        let categories = get_all_categories(&connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for edit transaction page: {error}")
        })?;

        (transaction, categories)
    };

    let max_date = local_now(&state.local_timezone)?.date();

    Ok(edit_transaction_view(max_date, &transaction, &categories).into_response())
}

fn edit_transaction_view(
    max_date: Date,
    transaction: &Transaction,
    categories: &[Category],
) -> Markup {
    let edit_endpoint =
        endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let time = transaction.time.to_string();
    let defaults = TransactionFormDefaults {
        kind: TransactionKind::from_is_expense(transaction.is_expense),
        amount: Some(transaction.amount),
        date: transaction.date,
        time: &time,
        description: Some(transaction.description.as_str()),
        category_id: Some(&transaction.category_id),
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
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (transaction_form_fields(&defaults, categories))

                (form_submit_button("Update Transaction"))
            }
        }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}
