//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::authz::AccessDenied;
use crate::db::RepositoryError;
use crate::pagination::PaginationError;
use crate::updater::UpdateError;
use crate::validation::ValidationErrors;

/// Headline of every validation error response.
pub const VALIDATION_FAILED: &str = "Error: Some data are incorrect or missing. Try Again.";

/// Message for a page past the end of the data.
pub const EMPTY_PAGE: &str = "No items are available on this page";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource or page not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Acting customer does not own the record.
    #[error("Forbidden: {0}")]
    Forbidden(#[from] AccessDenied),

    /// Missing or unknown API token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Write collided with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<PaginationError> for AppError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::EmptyPage(_) => Self::NotFound(EMPTY_PAGE.to_owned()),
            PaginationError::Serialization(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<UpdateError> for AppError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::NothingToUpdate => Self::BadRequest(err.to_string()),
            UpdateError::Invalid(errors) => Self::Validation(errors),
            UpdateError::Repository(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match self {
            Self::Validation(errors) => {
                let body = json!({
                    "code": status.as_u16(),
                    "error": VALIDATION_FAILED,
                    "error_details": errors,
                });
                return (status, Json(body)).into_response();
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Forbidden(denied) => denied.to_string(),
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg) => msg,
        };

        let body = json!({
            "status": status.as_u16(),
            "message": format!("Error : {message}"),
        });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context to the authenticated customer.
///
/// Call this after successful authentication to associate errors with customers.
pub fn set_sentry_user(customer_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}
