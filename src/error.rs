//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{
    alert::Alert, category::CategoryId, forbidden::ForbiddenError,
    internal_server_error::InternalServerError, not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of user ID and password.
    #[error("invalid user ID or password")]
    InvalidCredentials,

    /// The request's cookie jar is missing the auth or expiry cookie.
    #[error("the auth cookie is missing from the request")]
    CookieMissing,

    /// A date string from a filter or report form could not be parsed.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// A time string was not a valid 24-hour HH:MM value.
    #[error("could not parse \"{0}\" as a time of day")]
    InvalidTime(String),

    /// The password the user chose is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The password hashing library returned an unexpected error.
    ///
    /// The wrapped string is for server logs only and must never reach the
    /// client.
    #[error("password hashing failed: {0}")]
    HashingError(String),

    /// The password reset token was malformed, tampered with or past its
    /// expiry time.
    #[error("invalid or expired password reset token")]
    InvalidResetToken,

    /// The category ID used to create a transaction did not match a valid
    /// category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A category ID that was not a 4-digit number was used to create a
    /// category.
    #[error("Category ID must be a 4-digit number")]
    InvalidCategoryId(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A future date was submitted for a transaction or revenue entry.
    ///
    /// Both record money that has already moved, so dates after today are
    /// rejected.
    #[error("the date {0} is in the future")]
    FutureDate(Date),

    /// The specified user ID already exists in the database.
    #[error("the user ID \"{0}\" is already registered")]
    DuplicateUserId(String),

    /// The specified email address already belongs to a registered user.
    #[error("the email address \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// The specified category ID already exists in the database.
    #[error("the category ID \"{0}\" already exists in the database")]
    DuplicateCategoryId(String),

    /// No resource matched the request.
    ///
    /// Database queries that return no rows are converted into this error, so
    /// a missing row and a bad ID in a URL both end up here.
    #[error("the requested resource does not exist")]
    NotFound,

    /// The requested resource exists but belongs to another user.
    #[error("the requested resource belongs to another user")]
    Forbidden,

    /// Any SQL error without a more specific mapping.
    #[error("unexpected SQL error: {0}")]
    SqlError(rusqlite::Error),

    /// The configured timezone did not name a canonical timezone.
    #[error("\"{0}\" is not a valid canonical timezone")]
    InvalidTimezoneError(String),

    /// Serializing a value to JSON failed.
    #[error("JSON serialization failed: {0}")]
    JSONSerializationError(String),

    /// The mutex guarding the database connection was poisoned.
    #[error("the database lock could not be acquired")]
    DatabaseLockError,

    /// Sending an email failed.
    #[error("could not send email: {0}")]
    EmailError(String),

    /// Encoding a report export file failed.
    #[error("could not encode export file: {0}")]
    ExportError(String),

    /// The transaction to delete does not exist.
    #[error("cannot delete a transaction that does not exist")]
    DeleteMissingTransaction,

    /// The transaction to update does not exist.
    #[error("cannot update a transaction that does not exist")]
    UpdateMissingTransaction,

    /// The category to update does not exist.
    #[error("cannot update a category that does not exist")]
    UpdateMissingCategory,

    /// The category to delete does not exist.
    #[error("cannot delete a category that does not exist")]
    DeleteMissingCategory,

    /// The category to delete still has transactions referencing it.
    #[error("cannot delete a category that transactions still use")]
    CategoryInUse,

    /// The revenue entry to update does not exist.
    #[error("cannot update a revenue entry that does not exist")]
    UpdateMissingRevenue,

    /// The revenue entry to delete does not exist.
    #[error("cannot delete a revenue entry that does not exist")]
    DeleteMissingRevenue,

    /// A zero or negative amount was used for a revenue entry.
    #[error("the amount {0} is not allowed, revenue amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// A revenue description exceeded the maximum length of 200 characters.
    #[error("the description is {0} characters long, the maximum is 200")]
    DescriptionTooLong(usize),

    /// A string that does not name one of the revenue types was submitted.
    #[error("\"{0}\" is not a valid revenue type")]
    InvalidRevenueType(String),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::QueryReturnedNoRows = error {
            return Error::NotFound;
        }

        tracing::error!("unhandled SQL error: {error}");
        Error::SqlError(error)
    }
}

/// What the server operator should do about an unresolvable timezone name.
fn timezone_fix(timezone: &str) -> String {
    format!(
        "The timezone \"{timezone}\" could not be resolved. Update the server settings so the \
        timezone is a canonical name such as \"Pacific/Auckland\"."
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::Forbidden => ForbiddenError.into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid timezone configuration",
                fix: &timezone_fix(&timezone),
            }
            .into_response(),
            // The remaining variants carry internal detail that must stay out of the page.
            error => {
                tracing::error!("unexpected error reached the response layer: {error}");
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid timezone configuration".to_owned(),
                    details: timezone_fix(&timezone),
                },
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!(
                        "The date {date} is after today. \
                        Change it to today or earlier."
                    ),
                },
            ),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!(
                        "Could not understand the date \"{date}\". \
                        Enter dates in the format YYYY-MM-DD."
                    ),
                },
            ),
            Error::InvalidTime(time) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid time".to_owned(),
                    details: format!(
                        "Could not understand the time \"{time}\". \
                        Enter times in the 24-hour format HH:MM."
                    ),
                },
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category ID".to_owned(),
                    details: format!("Could not find a category with the ID {category_id:?}"),
                },
            ),
            Error::InvalidCategoryId(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category ID".to_owned(),
                    details: format!(
                        "\"{category_id}\" is not a valid category ID. \
                        Category ID must be a 4-digit number."
                    ),
                },
            ),
            Error::EmptyCategoryName => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category name".to_owned(),
                    details: "Category name cannot be empty.".to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update category".to_owned(),
                    details: "The category could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted."
                        .to_owned(),
                },
            ),
            Error::CategoryInUse => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: "Cannot delete a category that is being used in transactions. \
                    Delete or recategorize those transactions first."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingRevenue => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update revenue entry".to_owned(),
                    details: "The revenue entry could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingRevenue => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete revenue entry".to_owned(),
                    details: "The revenue entry could not be found. \
                    Try refreshing the page to see if the entry has already been deleted."
                        .to_owned(),
                },
            ),
            Error::NonPositiveAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "The amount {amount} is not allowed. \
                        Revenue amounts must be greater than zero."
                    ),
                },
            ),
            Error::DescriptionTooLong(length) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Description too long".to_owned(),
                    details: format!(
                        "The description is {length} characters long. \
                        Use at most 200 characters."
                    ),
                },
            ),
            Error::InvalidRevenueType(revenue_type) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid revenue type".to_owned(),
                    details: format!(
                        "\"{revenue_type}\" is not a valid revenue type. \
                        Choose one of the listed types."
                    ),
                },
            ),
            Error::DuplicateUserId(user_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate user ID".to_owned(),
                    details: format!(
                        "The user ID {user_id} is already registered. Choose a different user ID.",
                    ),
                },
            ),
            Error::DuplicateEmail(email) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate email address".to_owned(),
                    details: format!(
                        "The email address {email} is already registered. \
                        Log in with the existing account or use a different email address.",
                    ),
                },
            ),
            Error::DuplicateCategoryId(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate category ID".to_owned(),
                    details: format!(
                        "The category {category_id} already exists in the database. \
                        Choose a different ID, or edit or delete the existing category.",
                    ),
                },
            ),
            Error::InvalidResetToken => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid or expired reset token".to_owned(),
                    details: "The password reset link is no longer valid. \
                    Request a new password reset email."
                        .to_owned(),
                },
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Access denied".to_owned(),
                    details: "This item belongs to another user.".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred. The details are in the server logs."
                        .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
