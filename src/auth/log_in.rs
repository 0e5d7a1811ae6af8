//! The log-in page and the endpoint behind its form.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        User, UserId, get_user_by_id, invalidate_auth_cookie,
        redirect::normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    html::{
        FORM_TEXT_INPUT_STYLE, account_link, base, form_submit_button, labelled_form_field,
        log_in_register, password_input,
    },
    timezone::get_local_offset,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect user ID or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_form(user_id: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#user-id, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (labelled_form_field("user-id", "User ID", html! {
                input type="text" name="user_id" id="user-id" value=(user_id)
                    maxlength="20" class=(FORM_TEXT_INPUT_STYLE) required;
            }))

            (password_input("", 0, error_message))

            (remember_me_checkbox())

            (form_submit_button("Log in"))

            (account_link(
                "Forgot your password?",
                endpoints::FORGOT_PASSWORD_VIEW,
                "Reset it here",
            ))
            (account_link(
                "Don't have an account?",
                endpoints::REGISTER_VIEW,
                "Register here",
            ))
        }
    }
}

fn remember_me_checkbox() -> Markup {
    html! {
        div class="flex items-center gap-x-3"
        {
            input
                type="checkbox"
                name="remember_me"
                id="remember_me"
                tabindex="0"
                class="rounded-xs";

            label
                for="remember_me"
                class="block text-sm font-medium text-gray-900 dark:text-white"
            {
                "Keep me logged in for one week"
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

/// Render the log-in page, carrying an optional redirect target through to
/// the form.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form("", None, redirect_url.as_deref());

    base(
        "Log In",
        &[],
        &log_in_register("Log in to your account", &form),
    )
    .into_response()
}

/// The slice of [AppState] needed to process a log-in.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long an auth cookie stays valid after it is issued.
    pub cookie_duration: Duration,
    /// The canonical name of the server's local timezone, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The SQLite database connection holding the user table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// Lets `PrivateCookieJar` extract the signing key from the state.
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Check the submitted credentials and sign the user in.
///
/// On success the auth cookie is set and the client is sent to the dashboard,
/// or to the page it originally asked for. On failure the form is re-rendered
/// with an error message. The same message covers an unknown user ID and a
/// wrong password so that the response does not reveal which user IDs exist.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");

    let user = match authenticate(&user_data, &state) {
        Ok(user) => user,
        Err(message) => {
            return log_in_form(&user_data.user_id, Some(message), redirect_url.as_deref())
                .into_response();
        }
    };

    let cookie_duration = match user_data.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let redirect_target = redirect_url.as_deref().unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_target.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

/// Look up the user and check their password, returning the message to show
/// on the form when either step fails.
fn authenticate(user_data: &LogInData, state: &LoginState) -> Result<User, &'static str> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(INTERNAL_ERROR_MSG);
        }
    };

    let user = match get_user_by_id(&UserId::new(user_data.user_id.trim()), &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return Err(INTERNAL_ERROR_MSG);
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            Err(INTERNAL_ERROR_MSG)
        }
    }
}

/// The optional `redirect_url` query parameter on the log-in page.
#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// What the user typed into the log-in form.
///
/// The password stays a plain string here. It is only ever compared against
/// the stored hash, which was validated at registration.
#[derive(Deserialize)]
pub struct LogInData {
    /// The ID the user picked at registration.
    pub user_id: String,

    /// The password to check against the stored hash.
    pub password: String,

    /// Set when the "remember me" checkbox is ticked.
    ///
    /// Browsers leave unchecked checkboxes out of the submission entirely, so
    /// any `Some` value counts as checked.
    pub remember_me: Option<String>,

    /// Where to send the user after a successful log-in. Filled from the
    /// hidden input on the form, never from the query string.
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        extract::Query,
        http::{StatusCode, header::CONTENT_TYPE},
    };
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{RedirectQuery, get_log_in_page};

    async fn render_page(redirect_url: Option<&str>) -> scraper::Html {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: redirect_url.map(ToOwned::to_owned),
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        parse_html_document(response).await
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(content_type.starts_with("text/html"));

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = format!("form[hx-post='{}']", endpoints::LOG_IN_API);
        for css in [
            form_selector.as_str(),
            "input[type='text'][name='user_id']",
            "input[type='password'][name='password']",
            "input[type='checkbox'][name='remember_me']",
            "button[type='submit']",
        ] {
            let selector = Selector::parse(css).unwrap();
            assert_eq!(
                document.select(&selector).count(),
                1,
                "want exactly one element matching {css}"
            );
        }

        for href in [endpoints::FORGOT_PASSWORD_VIEW, endpoints::REGISTER_VIEW] {
            let selector = Selector::parse(&format!("form a[href='{href}']")).unwrap();
            assert_eq!(
                document.select(&selector).count(),
                1,
                "want a link to {href}"
            );
        }
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/transactions?from_date=2025-01-01&to_date=2025-10-05";

        let document = render_page(Some(redirect_url)).await;

        let selector = Selector::parse("input[name='redirect_url']").unwrap();
        let input = document
            .select(&selector)
            .next()
            .expect("expected a hidden redirect_url input");
        assert_eq!(input.value().attr("value"), Some(redirect_url));
    }

    #[tokio::test]
    async fn log_in_page_omits_redirect_input_by_default() {
        let document = render_page(None).await;

        let selector = Selector::parse("input[name='redirect_url']").unwrap();
        assert_eq!(document.select(&selector).count(), 0);
    }

    #[tokio::test]
    async fn log_in_page_drops_invalid_redirect_url() {
        let document = render_page(Some("https://evil.example/transactions")).await;

        let selector = Selector::parse("input[name='redirect_url']").unwrap();
        assert_eq!(document.select(&selector).count(), 0);
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form, Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, PasswordHash, User, UserId, create_user,
            create_user_table,
        },
        endpoints,
    };

    use super::{
        INTERNAL_ERROR_MSG, INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState,
        REMEMBER_ME_COOKIE_DURATION, post_log_in,
    };

    const PASSWORD: &str = "averygoodpassword1";

    fn alice() -> User {
        User {
            id: UserId::new("alice"),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: PasswordHash::from_raw_password(PASSWORD, 4)
                .expect("Could not hash test password"),
            budget: 1_000.0,
            monthly_income: 2_500.0,
        }
    }

    fn test_state(user: Option<User>) -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if let Some(user) = user {
            create_user(user, &connection).expect("Could not create test user");
        }

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(user_id: &str, password: &str) -> LogInData {
        LogInData {
            user_id: user_id.to_string(),
            password: password.to_string(),
            remember_me: None,
            redirect_url: None,
        }
    }

    async fn submit(state: LoginState, form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(form)).await
    }

    fn test_server(state: LoginState) -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);

        TestServer::new(app)
    }

    #[track_caller]
    fn assert_hx_redirect(response: &Response<Body>, want_location: &str) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), want_location);
    }

    fn auth_cookie(response: &Response<Body>) -> Option<Cookie<'static>> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
    }

    async fn assert_form_shows_message(response: Response<Body>, message: &str) {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let fragment = scraper::Html::parse_fragment(&String::from_utf8_lossy(&body));
        let error_selector = scraper::Selector::parse("p.text-red-500.text-base").unwrap();
        let error_text = fragment
            .select(&error_selector)
            .next()
            .expect("expected an error message paragraph")
            .text()
            .collect::<String>();

        assert_eq!(error_text.trim(), message);
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = submit(test_state(Some(alice())), log_in_data("alice", PASSWORD)).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let cookie = auth_cookie(&response).expect("no auth cookie set");
        assert!(cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let redirect_url = "/transactions?from_date=2025-01-01&to_date=2025-10-05";
        let mut form = log_in_data("alice", PASSWORD);
        form.redirect_url = Some(redirect_url.to_string());

        let response = submit(test_state(Some(alice())), form).await;

        assert_hx_redirect(&response, redirect_url);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let mut form = log_in_data("alice", PASSWORD);
        form.redirect_url = Some("https://example.com".to_string());

        let response = submit(test_state(Some(alice())), form).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let response = submit(
            test_state(Some(alice())),
            log_in_data("alice", "wrongpassword"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_form_shows_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user_id() {
        let response = submit(test_state(Some(alice())), log_in_data("mallory", PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_form_shows_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_shows_error_when_database_lock_is_poisoned() {
        let state = test_state(Some(alice()));

        let db_connection = state.db_connection.clone();
        std::thread::spawn(move || {
            let _guard = db_connection.lock().unwrap();
            panic!("poison the database lock");
        })
        .join()
        .unwrap_err();

        let response = submit(state, log_in_data("alice", PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_form_shows_message(response, INTERNAL_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let server = test_server(test_state(None));

        server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn log_in_form_accepts_missing_remember_me_field() {
        let server = test_server(test_state(None));
        let form = [("user_id", "alice"), ("password", "test")];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn remember_me_extends_the_auth_cookie() {
        let server = test_server(test_state(Some(alice())));
        let form = [
            ("user_id", "alice"),
            ("password", PASSWORD),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        let expires_at = response.cookie(COOKIE_TOKEN).expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION;
        assert!(
            (expires_at - want).abs() < Duration::seconds(2),
            "got expiry {expires_at}, want about {want}"
        );
    }
}
