//! Category creation endpoint.
//!
//! There is no dedicated creation page. The categories listing page embeds
//! the creation form, and this endpoint re-renders the form on validation
//! errors.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, CategoryName, create_category, domain::CategoryFormData},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, labelled_form_field},
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let category = match parse_category_form(&form_data) {
        Ok(category) => category,
        Err(error) => {
            return new_category_form_view(
                &form_data.id,
                &form_data.name,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(category, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn parse_category_form(form_data: &CategoryFormData) -> Result<Category, Error> {
    let id = CategoryId::new(&form_data.id)?;
    let name = CategoryName::new(&form_data.name)?;

    Ok(Category { id, name })
}

/// Render the category creation form.
///
/// The form keeps the submitted values so a validation error does not wipe
/// the user's input.
pub(crate) fn new_category_form_view(
    category_id: &str,
    category_name: &str,
    error_message: &str,
) -> Markup {
    let id_field = labelled_form_field("id", "Category ID", html! {
        input
            id="id"
            type="text"
            name="id"
            placeholder="e.g. 0712"
            value=(category_id)
            required
            maxlength="4"
            pattern="[0-9]{4}"
            class=(FORM_TEXT_INPUT_STYLE);
    });

    let name_field = labelled_form_field("name", "Category Name", html! {
        input
            id="name"
            type="text"
            name="name"
            placeholder="Category Name"
            value=(category_name)
            required
            class=(FORM_TEXT_INPUT_STYLE);
    });

    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (id_field)
            (name_field)

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::{StatusCode, header::CONTENT_TYPE},
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        category::{
            Category, CategoryId, CategoryName, create::CreateCategoryEndpointState,
            create_category, create_category_endpoint, create_category_table,
            domain::CategoryFormData, get_category,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, get_header,
            must_get_form, parse_html_fragment,
        },
    };

    fn category_database() -> Arc<Mutex<Connection>> {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");

        Arc::new(Mutex::new(connection))
    }

    fn category_form(id: &str, name: &str) -> Form<CategoryFormData> {
        Form(CategoryFormData {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    #[tokio::test]
    async fn can_create_category() {
        let state = CreateCategoryEndpointState {
            db_connection: category_database(),
        };
        let want = Category {
            id: CategoryId::new_unchecked("0712"),
            name: CategoryName::new_unchecked("Groceries"),
        };

        let response =
            create_category_endpoint(State(state.clone()), category_form("0712", "Groceries"))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        assert_eq!(
            Ok(want.clone()),
            get_category(&want.id, &state.db_connection.lock().unwrap())
        );
    }

    #[tokio::test]
    async fn create_category_fails_on_invalid_id() {
        let state = CreateCategoryEndpointState {
            db_connection: category_database(),
        };

        let response = create_category_endpoint(State(state), category_form("71", "Groceries"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_header(&response, CONTENT_TYPE.as_str()),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Category ID must be a 4-digit number");
    }

    #[tokio::test]
    async fn create_category_fails_on_empty_name() {
        let state = CreateCategoryEndpointState {
            db_connection: category_database(),
        };

        let response = create_category_endpoint(State(state), category_form("0712", ""))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Category name cannot be empty");
    }

    #[tokio::test]
    async fn create_category_fails_on_duplicate_id() {
        let db_connection = category_database();
        create_category(
            Category {
                id: CategoryId::new_unchecked("0712"),
                name: CategoryName::new_unchecked("Groceries"),
            },
            &db_connection.lock().unwrap(),
        )
        .expect("Could not create test category");
        let state = CreateCategoryEndpointState { db_connection };

        let response = create_category_endpoint(State(state), category_form("0712", "Takeaways"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
