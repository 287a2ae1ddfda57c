//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Authentication is not a layer: handlers that need a caller take the
//! [`RequireIdentity`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::{AuthRejection, RequireIdentity};
pub use request_id::request_id_middleware;
