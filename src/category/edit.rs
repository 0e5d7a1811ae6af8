//! Category editing page and endpoint.
//!
//! The category ID is the primary key that transactions reference, so only
//! the name can be edited.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        CategoryId, CategoryName, domain::EditCategoryFormData, get_category, update_category,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_TEXT_INPUT_STYLE, base,
        labelled_form_field,
    },
    navigation::NavBar,
};

/// The state needed for the edit category page.
#[derive(Debug, Clone)]
pub struct EditCategoryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, &category_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, &category_id);

    let category = match get_category(&category_id, &connection) {
        Ok(category) => category,
        Err(error) => {
            let error_message = if error == Error::NotFound {
                "Category not found"
            } else {
                tracing::error!("Failed to retrieve category {category_id}: {error}");
                "Failed to load category"
            };

            return Ok(edit_category_view(
                &edit_endpoint,
                &update_endpoint,
                category_id.as_ref(),
                "",
                error_message,
            )
            .into_response());
        }
    };

    Ok(edit_category_view(
        &edit_endpoint,
        &update_endpoint,
        category.id.as_ref(),
        category.name.as_ref(),
        "",
    )
    .into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<UpdateCategoryEndpointState>,
    Form(form_data): Form<EditCategoryFormData>,
) -> Response {
    // Validate the submitted name before touching the database.
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, &category_id);

            return edit_category_form_view(
                &update_endpoint,
                category_id.as_ref(),
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

    match update_category(&category_id, name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    category_id: &str,
    category_name: &str,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_category_form_view(update_endpoint, category_id, category_name, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form_view(
    update_category_endpoint: &str,
    category_id: &str,
    category_name: &str,
    error_message: &str,
) -> Markup {
    // Disabled inputs are not submitted, so the ID cannot change.
    let id_field = labelled_form_field("id", "Category ID", html! {
        input
            id="id"
            type="text"
            value=(category_id)
            disabled
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
            autofocus
            class=(FORM_TEXT_INPUT_STYLE);
    });

    html! {
        form
            hx-put=(update_category_endpoint)
            class="w-full space-y-4 md:space-y-6"
        {
            (id_field)
            (name_field)

            @if !error_message.is_empty() {
                p
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}
