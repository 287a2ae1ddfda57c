//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bilemo-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BILEMO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded in the
//! `bilemo-api` crate at compile time.

use bilemo_api::config::{ConfigError, database_url_from_env};
use bilemo_api::db::{MIGRATOR, create_pool};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the API database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url_from_env()?;

    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
