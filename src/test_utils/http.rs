//! Assertions on raw HTTP responses.

use axum::{body::Body, response::Response};

/// Get a header value as a string, panicking if it is missing or not UTF-8.
#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let Some(value) = response.headers().get(header_name) else {
        panic!("Response has no {header_name} header");
    };

    value
        .to_str()
        .expect("Header value is not valid UTF-8")
        .to_string()
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(get_header(response, "content-type"), content_type);
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}
