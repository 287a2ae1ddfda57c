//! BileMo Core - Shared types library.
//!
//! This crate provides common types used across all BileMo components:
//! - `api` - The catalog/customer REST API
//! - `cli` - Command-line tools for migrations and fixtures
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Record IDs, customer identity, emails, paging arithmetic and
//!   visibility groups

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
