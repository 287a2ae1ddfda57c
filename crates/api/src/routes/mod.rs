//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (store reachable)
//!
//! # Phones (requires token)
//! GET    /api/phones           - Catalog (unpaged unless ?page= is given)
//! GET    /api/phones/{id}      - Phone detail
//! POST   /api/phones           - Add a phone
//! PUT    /api/phones/{id}      - Partial update
//! DELETE /api/phones/{id}      - Remove a phone
//!
//! # Customers (requires token)
//! GET    /api/customers        - Customer directory (paged)
//! GET    /api/customers/{id}   - Customer detail
//!
//! # Users (requires token, owner only)
//! GET    /api/users            - Acting customer's users (paged, cached)
//! GET    /api/users/{id}       - User detail
//! POST   /api/users            - Add a user to the acting customer
//! PUT    /api/users/{id}       - Partial update
//! DELETE /api/users/{id}       - Remove a user
//! ```

pub mod customers;
pub mod health;
pub mod phones;
pub mod users;

use std::convert::Infallible;
use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, rejection::PathRejection},
    http::{Request, StatusCode, Uri, request::Parts},
    middleware::from_fn,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{Span, field::Empty, info_span};

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::services::not_found;
use crate::state::AppState;

/// Message for a request body that is not the expected JSON.
pub const MALFORMED_BODY: &str =
    "The requested data is missing or incorrect. Please refer to the documentation @ /api/doc/";

/// The first raw `?page=` value, if any.
///
/// Never rejects: a query string that does not decode, or a repeated
/// `page`, still reaches [`Paginator::normalize_page`](crate::pagination::Paginator::normalize_page)
/// instead of failing the request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageParam(pub Option<String>);

impl PageParam {
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        let page = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(pairs)| {
                pairs
                    .into_iter()
                    .find(|(key, _)| key == "page")
                    .map(|(_, value)| value)
            });
        Self(page)
    }

    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PageParam {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

/// Parse a record id from the path. An unparsable id names no record.
pub(crate) fn parse_id<T: FromStr>(raw: &str, kind: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| not_found(kind))
}

/// Like [`parse_id`], for the raw path extraction. A segment that does not
/// even decode names no record either.
pub(crate) fn path_id<T: FromStr>(
    path: Result<Path<String>, PathRejection>,
    kind: &str,
) -> Result<T, AppError> {
    let Path(raw) = path.map_err(|_| not_found(kind))?;
    parse_id(&raw, kind)
}

/// `{"status": <code>, "message": <text>}` acknowledgement body.
pub(crate) fn acknowledge(status: StatusCode, message: String) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "status": status.as_u16(), "message": message })),
    )
}

/// Create the phone routes router.
pub fn phone_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(phones::index).post(phones::create))
        .route(
            "/{id}",
            get(phones::show).put(phones::update).delete(phones::destroy),
        )
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index))
        .route("/{id}", get(customers::show))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/phones", phone_routes())
        .nest("/api/customers", customer_routes())
        .nest("/api/users", user_routes())
}

fn make_span<B>(request: &Request<B>) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = Empty,
        customer = Empty,
    )
}

/// The complete application router with health checks and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .with_state(state)
}
