//! Defines the endpoint for deleting a revenue entry.

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
    revenue::core::delete_revenue,
};

/// The state needed to delete a revenue entry.
#[derive(Debug, Clone)]
pub struct DeleteRevenueState {
    /// The database connection for managing revenue entries.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRevenueState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a revenue entry, responds with an alert.
pub async fn delete_revenue_endpoint(
    State(state): State<DeleteRevenueState>,
    Extension(user_id): Extension<UserId>,
    Path(revenue_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_revenue(revenue_id, &user_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Revenue entry deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::DeleteMissingRevenue | Error::Forbidden)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting revenue entry {revenue_id}: {error}"
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
        db::initialize_db,
        revenue::{Revenue, RevenueType, create_revenue, get_revenue},
    };

    use super::{DeleteRevenueState, delete_revenue_endpoint};

    fn get_test_state() -> (DeleteRevenueState, UserId) {
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

        let state = DeleteRevenueState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id)
    }

    fn create_test_revenue(state: &DeleteRevenueState, user_id: &UserId) -> Revenue {
        let connection = state.db_connection.lock().unwrap();

        create_revenue(
            Revenue::build(250.0, date!(2025 - 03 - 01), RevenueType::Salary, "March pay"),
            user_id,
            &connection,
        )
        .expect("Could not create test revenue entry")
    }

    #[tokio::test]
    async fn can_delete_revenue() {
        let (state, user_id) = get_test_state();
        let revenue = create_test_revenue(&state, &user_id);

        let response = delete_revenue_endpoint(
            State(state.clone()),
            Extension(user_id.clone()),
            Path(revenue.id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_revenue(revenue.id, &user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn cannot_delete_other_users_revenue() {
        let (state, user_id) = get_test_state();
        let revenue = create_test_revenue(&state, &user_id);
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

        let response = delete_revenue_endpoint(
            State(state.clone()),
            Extension(other_user_id),
            Path(revenue.id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_revenue(revenue.id, &user_id, &connection).is_ok());
    }

    #[tokio::test]
    async fn deleting_unknown_revenue_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_revenue_endpoint(State(state), Extension(user_id), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
