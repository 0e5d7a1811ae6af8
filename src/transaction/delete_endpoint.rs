//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserId,
    db::DatabaseId,
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &user_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{PasswordHash, User, UserId, create_user},
        category::{Category, CategoryId, CategoryName, create_category},
        db::initialize_db,
        transaction::{TimeOfDay, Transaction, create_transaction, get_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_test_state() -> (DeleteTransactionState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user = create_user(
            User {
                id: UserId::new("alice"),
                name: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                budget: 1000.0,
                monthly_income: 2000.0,
            },
            &connection,
        )
        .expect("Could not create test user");
        create_category(
            Category {
                id: CategoryId::new_unchecked("0712"),
                name: CategoryName::new_unchecked("Groceries"),
            },
            &connection,
        )
        .expect("Could not create test category");

        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id)
    }

    fn create_test_transaction(state: &DeleteTransactionState, user_id: &UserId) -> Transaction {
        let connection = state.db_connection.lock().unwrap();

        create_transaction(
            Transaction::build(
                12.3,
                date!(2025 - 03 - 01),
                TimeOfDay::new_unchecked("12:30"),
                CategoryId::new_unchecked("0712"),
                "Lunch",
            ),
            user_id,
            &connection,
        )
        .expect("Could not create test transaction")
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let (state, user_id) = get_test_state();
        let transaction = create_test_transaction(&state, &user_id);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id.clone()),
            Path(transaction.id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(transaction.id, &user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let (state, user_id) = get_test_state();
        let transaction = create_test_transaction(&state, &user_id);
        let other_user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                User {
                    id: UserId::new("bob"),
                    name: "bob".to_owned(),
                    email: "bob@example.com".to_owned(),
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                    budget: 1000.0,
                    monthly_income: 2000.0,
                },
                &connection,
            )
            .expect("Could not create test user")
            .id
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(other_user_id),
            Path(transaction.id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(transaction.id, &user_id, &connection).is_ok());
    }

    #[tokio::test]
    async fn deleting_unknown_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_transaction_endpoint(State(state), Extension(user_id), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
