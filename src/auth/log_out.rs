//! Log-out route handler that invalidates authentication cookies and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserId, set_auth_cookie},
        endpoints,
    };

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_redirects_to_log_in_page() {
        let response = get_log_out(signed_in_jar()).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }

    #[tokio::test]
    async fn log_out_expires_the_auth_cookie() {
        let response = get_log_out(signed_in_jar()).await;

        let mut found_auth_cookie = false;

        for header in response.headers().get_all(SET_COOKIE) {
            let cookie = Cookie::parse(header.to_str().unwrap()).unwrap();

            if cookie.name() == COOKIE_TOKEN {
                found_auth_cookie = true;
                assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
                assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            }
        }

        assert!(found_auth_cookie, "no Set-Cookie header for the auth cookie");
    }

    fn signed_in_jar() -> PrivateCookieJar {
        let key = Key::from(&Sha512::digest("log out tests"));
        let jar = PrivateCookieJar::new(key);

        set_auth_cookie(
            jar,
            UserId::new("alice"),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap()
    }
}
