//! The forgot password page and the endpoint that emails password reset links.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{
        get_user_by_email,
        reset_token::{RESET_TOKEN_DURATION, create_reset_token},
    },
    email::{EmailConfig, send_reset_email},
    endpoints::{self, format_endpoint},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_register},
};

fn forgot_password_form(error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::FORGOT_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Enter the email address for your account and we will send you a link to \
                reset your password."
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus;
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Send Reset Link"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Remembered your password? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// The query parameters for the forgot password page.
#[derive(Deserialize)]
pub struct ForgotPasswordQuery {
    /// Set when the user followed a reset link that was no longer valid.
    #[serde(default)]
    invalid_token: bool,
}

/// Display the page for requesting a password reset email.
pub async fn get_forgot_password_page(Query(query): Query<ForgotPasswordQuery>) -> Response {
    let error_message = query
        .invalid_token
        .then_some("The password reset link is invalid or has expired. Request a new one below.");

    let forgot_password_form = forgot_password_form(error_message);
    let content = log_in_register("Reset your password", &forgot_password_form);
    base("Forgot Password", &[], &content).into_response()
}

/// The state needed for sending password reset emails.
#[derive(Debug, Clone)]
pub struct ForgotPasswordState {
    /// The key used for signing password reset tokens.
    pub cookie_key: Key,
    /// The external URL of the server, used to build reset links.
    pub server_url: String,
    /// The SMTP settings, or `None` if email is not configured.
    pub email_config: Option<EmailConfig>,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ForgotPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            server_url: state.server_url.clone(),
            email_config: state.email_config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The email address entered in the forgot password form.
#[derive(Serialize, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Handler for password reset requests.
///
/// Looks up the account for the submitted email address and, if one exists
/// and SMTP is configured, emails a signed reset link. The outcome is
/// reported to the user as an alert.
pub async fn post_forgot_password(
    State(state): State<ForgotPasswordState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let user_result = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        get_user_by_email(form.email.trim(), &connection)
    };

    let user = match user_result {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return Alert::ErrorSimple {
                message: "No account found with that email address.".to_owned(),
            }
            .into_response();
        }
        Err(error) => {
            tracing::error!("could not look up user by email: {error}");
            return error.into_alert_response();
        }
    };

    let Some(email_config) = &state.email_config else {
        tracing::error!("email configuration is missing, cannot send password reset email");

        return Alert::ErrorSimple {
            message: "Email service is not properly configured. Please contact support."
                .to_owned(),
        }
        .into_response();
    };

    let token = match create_reset_token(user.id, RESET_TOKEN_DURATION, &state.cookie_key) {
        Ok(token) => token,
        Err(error) => {
            tracing::error!("could not create password reset token: {error}");
            return error.into_alert_response();
        }
    };

    let reset_url = format!(
        "{}{}",
        state.server_url,
        format_endpoint(endpoints::RESET_PASSWORD_VIEW, &token)
    );

    match send_reset_email(email_config, &user.email, &reset_url) {
        Ok(()) => Alert::SuccessSimple {
            message: "An email has been sent with instructions to reset your password."
                .to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("failed to send password reset email: {error}");

            Alert::ErrorSimple {
                message: "Error sending email. Please try again later.".to_owned(),
            }
            .into_response()
        }
    }
}
