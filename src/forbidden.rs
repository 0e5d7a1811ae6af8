//! The 403 page shown when a user requests another user's data.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// The response for when a resource exists but belongs to another user.
pub struct ForbiddenError;

impl IntoResponse for ForbiddenError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            error_view(
                "Forbidden",
                "403",
                "You do not have access to this item.",
                "It belongs to another user. Head back to the homepage to see your own data.",
            ),
        )
            .into_response()
    }
}
