//! `BileMo` catalog API library.
//!
//! This crate provides the API as a library so the binary, the CLI and the
//! integration tests share one router and one data layer.
//!
//! The request-scoped access layer lives in four modules:
//!
//! - [`cache`] - per-identity list caching with explicit invalidation
//! - [`pagination`] - page slicing and group-scoped serialization
//! - [`updater`] - validated partial updates through field-setter tables
//! - [`authz`] - same-tenant ownership checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;
pub mod updater;
pub mod validation;
