//! Authentication extractors.
//!
//! Resolves the `Authorization: Bearer <token>` header to the customer that
//! owns the token. The result is an explicit [`Identity`] handed to the
//! handler; nothing about the caller is stored in ambient state.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use bilemo_core::Identity;
use serde_json::json;
use tracing::{Span, error};

use crate::error::set_sentry_user;
use crate::state::AppState;

pub const MISSING_TOKEN: &str = "No connection token detected. Please login to use this resource";
pub const INVALID_TOKEN: &str = "Token not valid! Please enter it again or login";

/// Extractor that requires a valid API token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireIdentity(identity): RequireIdentity,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.name)
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Error returned when the request carries no usable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
    /// The token store could not be queried.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, MISSING_TOKEN),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, INVALID_TOKEN),
            Self::Unavailable => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        let body = json!({ "status": status.as_u16(), "message": message });
        (status, Json(body)).into_response()
    }
}

/// The token part of a `Bearer` authorization value.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;
        let hash = state.tokens().hash(token);

        let customer = state
            .store()
            .customer_by_token(&hash)
            .await
            .map_err(|e| {
                error!(error = %e, "Token lookup failed");
                AuthRejection::Unavailable
            })?
            .ok_or(AuthRejection::InvalidToken)?;

        Span::current().record("customer", customer.username.as_str());
        set_sentry_user(&customer.id, customer.username.as_str());

        Ok(Self(customer.identity()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap_or_default().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(Some("abc123"))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[test]
    fn test_rejection_status() {
        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Unavailable.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
