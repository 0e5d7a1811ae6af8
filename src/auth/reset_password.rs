//! The page for choosing a new password from an emailed reset link.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::Key;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, ValidatedPassword,
        register_user::{PASSWORD_INPUT_MIN_LENGTH, confirm_password_input},
        reset_token::verify_reset_token,
        update_user_password,
    },
    endpoints::{self, format_endpoint},
    html::{base, loading_spinner, log_in_register, password_input},
    internal_server_error::get_internal_server_error_redirect,
};

fn reset_password_form(
    token: &str,
    password: &str,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(format_endpoint(endpoints::RESET_PASSWORD_API, token))
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, password_error_message))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, confirm_password_error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Reset Password"
            }
        }
    }
}

/// The state needed for resetting a user's password.
#[derive(Debug, Clone)]
pub struct ResetPasswordState {
    /// The key used for verifying password reset tokens.
    pub cookie_key: Key,
    /// The database connection for updating the user's password.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ResetPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the page for choosing a new password.
///
/// An invalid or expired token redirects back to the forgot password page
/// with a notice.
pub async fn get_reset_password_page(
    State(state): State<ResetPasswordState>,
    Path(token): Path<String>,
) -> Response {
    if verify_reset_token(&token, &state.cookie_key).is_err() {
        let redirect_url = format!("{}?invalid_token=true", endpoints::FORGOT_PASSWORD_VIEW);

        return Redirect::to(&redirect_url).into_response();
    }

    let reset_password_form = reset_password_form(&token, "", None, None);
    let content = log_in_register("Choose a new password", &reset_password_form);
    base("Reset Password", &[], &content).into_response()
}

/// The new password entered in the reset password form.
#[derive(Serialize, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

/// Handler for setting a new password with a reset token.
///
/// The token is verified again since the form can be submitted long after the
/// page was opened. On success the client is redirected to the log-in page.
pub async fn post_reset_password(
    State(state): State<ResetPasswordState>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let user_id = match verify_reset_token(&token, &state.cookie_key) {
        Ok(user_id) => user_id,
        Err(error) => return error.into_alert_response(),
    };

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(error) => {
            return reset_password_form(
                &token,
                &form.password,
                Some(error.to_string().as_ref()),
                None,
            )
            .into_response();
        }
    };

    if form.password != form.confirm_password {
        return reset_password_form(&token, &form.password, None, Some("Passwords do not match"))
            .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_user_password(&user_id, &password_hash, &connection) {
        Ok(()) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            (),
        )
            .into_response(),
        Err(Error::NotFound) => Error::InvalidResetToken.into_alert_response(),
        Err(error) => {
            tracing::error!("an error occurred while updating a user's password: {error}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod reset_password_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{StatusCode, header::LOCATION},
    };
    use axum_extra::extract::cookie::Key;
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        auth::{UserId, reset_token::create_reset_token},
        test_utils::{
            assert_form_input, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::{ResetPasswordState, get_reset_password_page};

    fn get_test_state() -> ResetPasswordState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");

        ResetPasswordState {
            cookie_key: Key::from(&[13u8; 64]),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_reset_password_page_with_valid_token() {
        let state = get_test_state();
        let token = create_reset_token(UserId::new("alice"), Duration::hours(1), &state.cookie_key)
            .expect("Could not create reset token");

        let response = get_reset_password_page(State(state), Path(token)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
    }

    #[tokio::test]
    async fn invalid_token_redirects_to_forgot_password_page() {
        let state = get_test_state();

        let response = get_reset_password_page(State(state), Path("bogus".to_string())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(LOCATION)
            .expect("No location header")
            .to_str()
            .unwrap();
        assert_eq!(location, "/forgot_password?invalid_token=true");
    }

    #[tokio::test]
    async fn expired_token_redirects_to_forgot_password_page() {
        let state = get_test_state();
        let token = create_reset_token(
            UserId::new("alice"),
            Duration::seconds(-5),
            &state.cookie_key,
        )
        .expect("Could not create reset token");

        let response = get_reset_password_page(State(state), Path(token)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

#[cfg(test)]
mod post_reset_password_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::cookie::Key;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        auth::{
            PasswordHash, User, UserId, create_user, create_user_table, get_user_by_id,
            reset_token::create_reset_token,
        },
        endpoints,
    };

    use super::{ResetPasswordForm, ResetPasswordState, post_reset_password};

    const NEW_PASSWORD: &str = "anewverysecurepassword!!";

    fn get_test_state() -> ResetPasswordState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_user(
            User {
                id: UserId::new("alice"),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: PasswordHash::from_raw_password("theoldpassword12345", 4)
                    .expect("Could not hash password"),
                budget: 0.0,
                monthly_income: 0.0,
            },
            &connection,
        )
        .expect("Could not create test user");

        ResetPasswordState {
            cookie_key: Key::from(&[13u8; 64]),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn reset_password_updates_user_and_redirects_to_log_in() {
        let state = get_test_state();
        let token = create_reset_token(UserId::new("alice"), Duration::hours(1), &state.cookie_key)
            .expect("Could not create reset token");

        let response = post_reset_password(
            State(state.clone()),
            Path(token),
            Form(ResetPasswordForm {
                password: NEW_PASSWORD.to_string(),
                confirm_password: NEW_PASSWORD.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(&UserId::new("alice"), &connection)
            .expect("Could not get test user");
        assert!(user.password_hash.verify(NEW_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn reset_password_fails_with_expired_token() {
        let state = get_test_state();
        let token = create_reset_token(
            UserId::new("alice"),
            Duration::seconds(-5),
            &state.cookie_key,
        )
        .expect("Could not create reset token");

        let response = post_reset_password(
            State(state.clone()),
            Path(token),
            Form(ResetPasswordForm {
                password: NEW_PASSWORD.to_string(),
                confirm_password: NEW_PASSWORD.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_old_password_still_works(&state);
    }

    #[tokio::test]
    async fn reset_password_fails_with_mismatched_passwords() {
        let state = get_test_state();
        let token = create_reset_token(UserId::new("alice"), Duration::hours(1), &state.cookie_key)
            .expect("Could not create reset token");

        let response = post_reset_password(
            State(state.clone()),
            Path(token),
            Form(ResetPasswordForm {
                password: NEW_PASSWORD.to_string(),
                confirm_password: "adifferentpassword".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_old_password_still_works(&state);
    }

    #[tokio::test]
    async fn reset_password_fails_with_weak_password() {
        let state = get_test_state();
        let token = create_reset_token(UserId::new("alice"), Duration::hours(1), &state.cookie_key)
            .expect("Could not create reset token");

        let response = post_reset_password(
            State(state.clone()),
            Path(token),
            Form(ResetPasswordForm {
                password: "password1234".to_string(),
                confirm_password: "password1234".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_old_password_still_works(&state);
    }

    #[tokio::test]
    async fn reset_password_fails_for_deleted_user() {
        let state = get_test_state();
        let token = create_reset_token(UserId::new("bob"), Duration::hours(1), &state.cookie_key)
            .expect("Could not create reset token");

        let response = post_reset_password(
            State(state),
            Path(token),
            Form(ResetPasswordForm {
                password: NEW_PASSWORD.to_string(),
                confirm_password: NEW_PASSWORD.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[track_caller]
    fn assert_old_password_still_works(state: &ResetPasswordState) {
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(&UserId::new("alice"), &connection)
            .expect("Could not get test user");
        assert!(
            user.password_hash.verify("theoldpassword12345").unwrap(),
            "the password should not have been changed"
        );
    }
}
