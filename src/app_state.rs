//! Shared state handed to every route handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, auth::DEFAULT_COOKIE_DURATION, db::initialize_db, email::EmailConfig,
    pagination::PaginationConfig,
};

/// Everything the route handlers need to serve a request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// How long an auth cookie stays valid after it is issued.
    pub cookie_duration: Duration,

    /// The canonical name of the server's local timezone, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The external URL of the server, used when writing links into emails.
    pub server_url: String,

    /// The SMTP settings for password reset emails, or `None` if email is not
    /// configured.
    pub email_config: Option<EmailConfig>,

    /// Controls how lists of data are split into pages.
    pub pagination_config: PaginationConfig,

    /// The SQLite database connection, shared across handlers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create the application state and set up the database schema.
    ///
    /// `local_timezone` must be a valid, canonical timezone name, e.g.
    /// "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database schema could not be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        server_url: &str,
        email_config: Option<EmailConfig>,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize_db(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            server_url: server_url.to_owned(),
            email_config,
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// Lets `PrivateCookieJar` extract the signing key from the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive a cookie signing key from an arbitrary secret string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
