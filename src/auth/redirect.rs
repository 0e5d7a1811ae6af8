//! Validation of post-log-in redirect targets.
//!
//! The log-in page carries a `redirect_url` query parameter so that a user
//! who followed a deep link lands on the page they asked for once they have
//! signed in. These helpers ensure that parameter can only ever point back
//! into the application.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

/// Validate a redirect target taken from untrusted input.
///
/// Returns the path and query of `raw_url` if it stays within the application,
/// or `None` for absolute URLs, protocol-relative URLs and redirects that
/// would loop back to the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri: Uri = raw_url.parse().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_path_and_query(&uri)
}

/// Like [`normalize_redirect_url`] but for the `HX-Current-URL` header, which
/// browsers send as an absolute URL. The scheme and host are discarded and
/// only the local part is kept.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri: Uri = raw_url.parse().ok()?;

    local_path_and_query(&uri)
}

fn local_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    // A protocol-relative URL ("//evil.example") must not pass as a local
    // path.
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return None;
    }

    let path = path_and_query
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(path_and_query);

    // Redirecting back to the log-in page would trap the user in a loop.
    (path != endpoints::LOG_IN_VIEW).then(|| path_and_query.to_owned())
}

/// Build the log-in page URL with a `redirect_url` parameter pointing back at
/// the page the client originally requested.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        hx_request_target(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&target)
}

pub(super) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {target}: {error}");
            None
        }
    }
}

/// Recover the page URL from the htmx headers of an `/api` request.
///
/// API routes are only ever called by htmx. The page to return to after
/// logging in is therefore the one in `HX-Current-URL`, not the request URI.
fn hx_request_target(request: &Request) -> Option<String> {
    let headers = request.headers();

    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if !is_hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let target = normalize_hx_current_url(current_url);

    if target.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    target
}
