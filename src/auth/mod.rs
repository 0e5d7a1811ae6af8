//! User accounts and authentication.
//!
//! This module contains:
//! - The `User` model, password hashing and password strength validation
//! - Cookie-based session tokens and the middleware that guards private routes
//! - Handlers for the log-in, log-out, registration and password reset pages

mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod reset_password;
mod reset_token;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use forgot_password::{get_forgot_password_page, post_forgot_password};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub use reset_password::{get_reset_password_page, post_reset_password};
pub(super) use token::Token;
pub use user::{
    User, UserId, create_user, create_user_table, get_user_by_email, get_user_by_id,
    update_user_password,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
