//! Depensier is a web app for tracking spending and revenue against a
//! monthly budget, with a separate ledger for each registered user.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod charts;
mod dashboard;
mod db;
mod email;
mod endpoints;
mod error;
mod forbidden;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod revenue;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserId, ValidatedPassword, create_user, get_user_by_id,
    update_user_password,
};
pub use category::{Category, CategoryId, CategoryName, create_category};
pub use db::initialize_db;
pub use email::EmailConfig;
pub use error::Error;
pub use pagination::PaginationConfig;
pub use revenue::{Revenue, RevenueType, create_revenue};
pub use routing::build_router;
pub use transaction::{TimeOfDay, Transaction, create_transaction};

/// Wait for the interrupt or terminate signal, whichever comes first, then
/// ask the server behind `handle` to shut down, giving in-flight requests one
/// second to finish.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let interrupt = async {
        signal::ctrl_c()
            .await
            .expect("Could not listen for the interrupt signal");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Could not listen for the terminate signal")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::debug!("Received the interrupt signal."),
        _ = terminate => tracing::debug!("Received the terminate signal."),
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
