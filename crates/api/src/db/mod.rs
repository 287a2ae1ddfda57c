//! Data access for the catalog API.
//!
//! Handlers and services talk to storage only through the [`DataStore`]
//! trait, so the same code runs against `PostgreSQL` ([`PgStore`]) in
//! production and an in-memory map ([`MemoryStore`]) in tests.
//!
//! # Tables
//!
//! - `customer` - API tenants and their hashed bearer tokens
//! - `phone` - catalog entries
//! - `app_user` - end-users, each owned by one customer
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bilemo-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use bilemo_core::CustomerName;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::{Customer, Phone, Record, User, Writable};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Embedded schema migrations for the API database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate customer name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Which records a query should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Only records owned by this customer. Kinds without an owner match
    /// nothing.
    OwnedBy(CustomerName),
}

/// Read access to one record kind.
#[async_trait]
pub trait RecordReader<R: Record>: Send + Sync {
    /// All matching records in ascending ID order.
    async fn find(&self, filter: &Filter) -> Result<Vec<R>, RepositoryError>;

    async fn get(&self, id: R::Id) -> Result<Option<R>, RepositoryError>;
}

/// Write access to one record kind.
#[async_trait]
pub trait RecordWriter<R: Writable>: RecordReader<R> {
    /// Insert a validated draft and return the stored record.
    async fn create(&self, draft: R::Draft) -> Result<R, RepositoryError>;

    /// Overwrite an existing record.
    ///
    /// Returns `RepositoryError::NotFound` if it no longer exists.
    async fn save(&self, record: &R) -> Result<(), RepositoryError>;

    /// Returns `RepositoryError::NotFound` if it does not exist.
    async fn delete(&self, id: R::Id) -> Result<(), RepositoryError>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait DataStore:
    RecordWriter<Phone> + RecordWriter<User> + RecordReader<Customer>
{
    /// Resolve a hashed bearer token to its customer.
    async fn customer_by_token(&self, token_hash: &str)
    -> Result<Option<Customer>, RepositoryError>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
