//! Middleware that gates routes behind the auth cookie.
//!
//! Wrap page routes with [auth_guard] and htmx API routes with
//! [auth_guard_hx]. Handlers behind either guard receive the signed-in user
//! through `Extension(user_id): Extension<UserId>`.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The slice of [AppState] the auth middleware needs.
#[derive(Clone)]
pub struct AuthState {
    /// The key for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long an auth cookie stays valid after it is issued.
    pub cookie_duration: Duration,
    /// The canonical name of the server's local timezone, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// Lets `PrivateCookieJar` extract the signing key from the state.
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How to send an unauthenticated client to the log-in page.
enum RedirectStyle {
    /// A `303 See Other` response, for regular page loads.
    Browser,
    /// An `HX-Redirect` header on a `200 OK` response, which tells htmx to
    /// perform a full page navigation.
    Htmx,
}

impl RedirectStyle {
    fn redirect(&self, url: &str) -> Response {
        match self {
            Self::Browser => Redirect::to(url).into_response(),
            Self::Htmx => (HxRedirect(url.to_owned()), StatusCode::OK).into_response(),
        }
    }
}

/// Require a valid auth cookie, redirecting to the log-in page otherwise.
///
/// Puts the ID of the signed-in user into the request extensions before
/// calling the inner handler.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    run_auth_guard(state, request, next, RedirectStyle::Browser).await
}

/// Like [auth_guard] but for htmx API routes, which need an `HX-Redirect`
/// header instead of an HTTP redirect.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    run_auth_guard(state, request, next, RedirectStyle::Htmx).await
}

async fn run_auth_guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect_style: RedirectStyle,
) -> Response {
    let log_in_url = log_in_url_for(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Error getting local timezone. Redirecting to log in page.");
        return redirect_style.redirect(&log_in_url);
    };

    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return redirect_style.redirect(&log_in_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => return redirect_style.redirect(&log_in_url),
    };

    parts.extensions.insert(user_id);

    let response = next.run(Request::from_parts(parts, body)).await;

    refresh_auth_cookie(response, jar, local_offset)
}

/// The log-in page URL that will bring the client back to the page it asked
/// for. Falls back to the dashboard when the original page cannot be
/// recovered.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to dashboard."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");
        }

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Push the cookie expiry out if it is about to lapse, copying the resulting
/// `Set-Cookie` headers onto the response.
fn refresh_auth_cookie(
    response: Response,
    jar: PrivateCookieJar,
    local_offset: UtcOffset,
) -> Response {
    let jar =
        match extend_auth_cookie_duration_if_needed(jar.clone(), Duration::minutes(5), local_offset)
        {
            Ok(updated_jar) => updated_jar,
            Err(error) => {
                tracing::error!(
                    "Error extending cookie duration: {error:?}. Rolling back cookie jar."
                );
                jar
            }
        };

    let (mut parts, body) = response.into_parts();

    for (name, value) in jar.into_response().headers() {
        if name == SET_COOKIE {
            parts.headers.append(name, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}
