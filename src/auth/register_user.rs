//! The registration page for creating a new user account.

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
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    auth::{PasswordHash, User, UserId, ValidatedPassword, create_user},
    endpoints,
    html::{
        FORM_TEXT_INPUT_STYLE, account_link, base, dollar_input_styles, field_error,
        form_submit_button, labelled_form_field, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The `minlength` set on the password inputs. The server runs its own
/// strength check on top of this client-side floor.
pub(super) const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// The maximum number of characters allowed in a user ID.
const USER_ID_MAX_LENGTH: usize = 20;

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    let input = html! {
        input type="password" name="confirm_password" id="confirm-password"
            placeholder="••••••••" class=(FORM_TEXT_INPUT_STYLE) required
            minlength=(min_length) autofocus[error_message.is_some()];

        (field_error(error_message))
    };

    labelled_form_field("confirm-password", "Confirm Password", input)
}

/// The values to pre-fill the registration form with, used to preserve the
/// user's input when the form is re-rendered with an error message.
#[derive(Default)]
struct RegistrationFormValues<'a> {
    user_id: &'a str,
    name: &'a str,
    email: &'a str,
    budget: Option<f64>,
    monthly_income: Option<f64>,
    password: &'a str,
}

impl<'a> From<&'a RegisterForm> for RegistrationFormValues<'a> {
    fn from(form: &'a RegisterForm) -> Self {
        Self {
            user_id: &form.user_id,
            name: &form.name,
            email: &form.email,
            budget: Some(form.budget),
            monthly_income: Some(form.monthly_income),
            password: &form.password,
        }
    }
}

/// Field-level error messages for the registration form.
#[derive(Default)]
struct RegistrationErrors<'a> {
    user_id: Option<&'a str>,
    name: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn text_input_with_error(
    label: &str,
    name: &str,
    id: &str,
    input_type: &str,
    value: &str,
    max_length: Option<usize>,
    error_message: Option<&str>,
) -> Markup {
    let input = html! {
        input type=(input_type) name=(name) id=(id) value=(value) maxlength=[max_length]
            class=(FORM_TEXT_INPUT_STYLE) required autofocus[error_message.is_some()];

        (field_error(error_message))
    };

    labelled_form_field(id, label, input)
}

fn dollar_input(label: &str, name: &str, id: &str, value: Option<f64>) -> Markup {
    let value_string = value.map(|number| format!("{number:.2}"));

    let input = html! {
        div class="input-wrapper w-full"
        {
            input type="number" name=(name) id=(id) step="0.01" min="0"
                value=[value_string.as_deref()] placeholder="0.00"
                class=(FORM_TEXT_INPUT_STYLE) required;
        }
    };

    labelled_form_field(id, label, input)
}

fn registration_form(values: &RegistrationFormValues, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#user-id, #name, #email, #budget, #monthly-income, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input_with_error(
                "User ID", "user_id", "user-id", "text", values.user_id,
                Some(USER_ID_MAX_LENGTH), errors.user_id,
            ))

            (text_input_with_error(
                "Name", "name", "name", "text", values.name, None, errors.name,
            ))

            (text_input_with_error(
                "Email", "email", "email", "email", values.email, None, errors.email,
            ))

            (dollar_input("Monthly Budget", "budget", "budget", values.budget))

            (dollar_input(
                "Monthly Income", "monthly_income", "monthly-income", values.monthly_income,
            ))

            (password_input(values.password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            (form_submit_button("Create Account"))

            (account_link(
                "Already have an account?",
                endpoints::LOG_IN_VIEW,
                "Log in here",
            ))
        }
    }
}

/// Render the page with the blank registration form.
pub async fn get_register_page() -> Response {
    let registration_form =
        registration_form(&RegistrationFormValues::default(), &RegistrationErrors::default());
    let content = log_in_register("Create your account", &registration_form);
    base("Register", &[dollar_input_styles()], &content).into_response()
}

/// The slice of [AppState] needed to create a user account.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub budget: f64,
    #[serde(default)]
    pub monthly_income: f64,
    pub password: String,
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the client is redirected to the log-in page.
/// Otherwise, the form is returned with field-level error messages.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let values = RegistrationFormValues::from(&user_data);

    let user_id = user_data.user_id.trim();
    if user_id.is_empty() {
        return registration_form(
            &values,
            &RegistrationErrors {
                user_id: Some("User ID must not be empty."),
                ..Default::default()
            },
        )
        .into_response();
    }

    if user_id.graphemes(true).count() > USER_ID_MAX_LENGTH {
        return registration_form(
            &values,
            &RegistrationErrors {
                user_id: Some("User ID must be 20 characters or fewer."),
                ..Default::default()
            },
        )
        .into_response();
    }

    if user_data.name.trim().is_empty() {
        return registration_form(
            &values,
            &RegistrationErrors {
                name: Some("Name must not be empty."),
                ..Default::default()
            },
        )
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(validated) => validated,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &values,
                &RegistrationErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &values,
            &RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("hashing the new user's password failed: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = User {
        id: UserId::new(user_id),
        name: user_data.name.trim().to_owned(),
        email: user_data.email.trim().to_owned(),
        password_hash,
        budget: user_data.budget,
        monthly_income: user_data.monthly_income,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_user(user, &connection) {
        Ok(_) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            (),
        )
            .into_response(),
        Err(Error::DuplicateUserId(_)) => registration_form(
            &values,
            &RegistrationErrors {
                user_id: Some("This user ID is already taken."),
                ..Default::default()
            },
        )
        .into_response(),
        Err(Error::DuplicateEmail(_)) => registration_form(
            &values,
            &RegistrationErrors {
                email: Some("This email address is already registered."),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::State,
        http::{Response, StatusCode},
    };
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, User, UserId, create_user, create_user_table, get_user_by_id},
        endpoints,
        test_utils::parse_html_fragment,
    };

    use super::{RegisterForm, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn test_form() -> RegisterForm {
        RegisterForm {
            user_id: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            budget: 1_000.0,
            monthly_income: 2_500.0,
            password: STRONG_PASSWORD.to_string(),
            confirm_password: STRONG_PASSWORD.to_string(),
        }
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let state = get_test_state();

        let response = register_user(State(state.clone()), Form(test_form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(&UserId::new("alice"), &connection)
            .expect("Could not get created user");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.budget, 1_000.0);
        assert_eq!(user.monthly_income, 2_500.0);
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn create_user_fails_when_password_is_weak() {
        let state = get_test_state();
        let mut form = test_form();
        form.password = "password1234".to_string();
        form.confirm_password = "password1234".to_string();

        let response = register_user(State(state.clone()), Form(form)).await;

        assert_error_message(response, "password is too weak").await;
        assert_no_user(&state, "alice");
    }

    #[tokio::test]
    async fn create_user_fails_when_passwords_do_not_match() {
        let state = get_test_state();
        let mut form = test_form();
        form.confirm_password = "thisisadifferentpassword".to_string();

        let response = register_user(State(state.clone()), Form(form)).await;

        assert_error_message(response, "passwords do not match").await;
        assert_no_user(&state, "alice");
    }

    #[tokio::test]
    async fn create_user_fails_when_user_id_is_empty() {
        let state = get_test_state();
        let mut form = test_form();
        form.user_id = "   ".to_string();

        let response = register_user(State(state), Form(form)).await;

        assert_error_message(response, "user id must not be empty").await;
    }

    #[tokio::test]
    async fn create_user_fails_when_user_id_is_too_long() {
        let state = get_test_state();
        let mut form = test_form();
        form.user_id = "a".repeat(21);

        let response = register_user(State(state.clone()), Form(form)).await;

        assert_error_message(response, "20 characters or fewer").await;
        assert_no_user(&state, &"a".repeat(21));
    }

    #[tokio::test]
    async fn create_user_fails_when_name_is_empty() {
        let state = get_test_state();
        let mut form = test_form();
        form.name = "".to_string();

        let response = register_user(State(state.clone()), Form(form)).await;

        assert_error_message(response, "name must not be empty").await;
        assert_no_user(&state, "alice");
    }

    #[tokio::test]
    async fn create_user_fails_with_duplicate_user_id() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                User {
                    id: UserId::new("alice"),
                    name: "Alice".to_string(),
                    email: "original@example.com".to_string(),
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                    budget: 0.0,
                    monthly_income: 0.0,
                },
                &connection,
            )
            .expect("Could not create test user");
        }

        let response = register_user(State(state), Form(test_form())).await;

        assert_error_message(response, "already taken").await;
    }

    #[tokio::test]
    async fn create_user_fails_with_duplicate_email() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                User {
                    id: UserId::new("bob"),
                    name: "Bob".to_string(),
                    email: "alice@example.com".to_string(),
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                    budget: 0.0,
                    monthly_income: 0.0,
                },
                &connection,
            )
            .expect("Could not create test user");
        }

        let response = register_user(State(state.clone()), Form(test_form())).await;

        assert_error_message(response, "already registered").await;
        assert_no_user(&state, "alice");
    }

    #[track_caller]
    fn assert_no_user(state: &RegistrationState, user_id: &str) {
        let connection = state.db_connection.lock().unwrap();
        assert!(
            get_user_by_id(&UserId::new(user_id), &connection).is_err(),
            "want no user with ID {user_id}, got one"
        );
    }

    async fn assert_error_message(response: Response<Body>, want_text: &str) {
        assert_eq!(response.status(), StatusCode::OK);

        let fragment = parse_html_fragment(response).await;
        let selector = scraper::Selector::parse("p.text-red-500").unwrap();
        let messages: Vec<String> = fragment
            .select(&selector)
            .map(|p| p.text().collect::<String>().to_lowercase())
            .collect();

        assert_eq!(messages.len(), 1, "want 1 error message, got {messages:?}");
        assert!(
            messages[0].contains(want_text),
            "'{}' does not contain '{want_text}'",
            messages[0]
        );
    }
}
