//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BILEMO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BILEMO_TOKEN_PEPPER` - HMAC key for API token hashing (high entropy, not a placeholder)
//!
//! ## Optional
//! - `BILEMO_HOST` - Bind address (default: 127.0.0.1)
//! - `BILEMO_PORT` - Listen port (default: 8000)
//! - `BILEMO_CACHE_TTL_SECS` - Lifetime of cached query results (default: 3600)
//! - `BILEMO_CACHE_CAPACITY` - Maximum cached entries (default: 10000)
//! - `BILEMO_PAGE_SIZE` - Items per page on paginated lists (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use bilemo_core::PageSize;
use secrecy::SecretString;
use thiserror::Error;

/// Default lifetime of a cached query result.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MIN_PEPPER_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Settings for the request-scoped access layer
    pub access: AccessSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Tunables for caching, pagination and token hashing.
///
/// Split from [`ApiConfig`] so tests can build an `AppState` without
/// touching the environment.
#[derive(Clone)]
pub struct AccessSettings {
    /// Lifetime of cached query results
    pub cache_ttl: Duration,
    /// Maximum number of cached entries
    pub cache_capacity: u64,
    /// Items per page on paginated lists
    pub page_size: PageSize,
    /// HMAC key used to hash bearer tokens before lookup
    pub token_pepper: SecretString,
}

impl std::fmt::Debug for AccessSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessSettings")
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_capacity", &self.cache_capacity)
            .field("page_size", &self.page_size)
            .field("token_pepper", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token pepper fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env()?;
        let host = parse_env("BILEMO_HOST", "127.0.0.1")?;
        let port = parse_env("BILEMO_PORT", "8000")?;
        let access = AccessSettings::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            access,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AccessSettings {
    /// Load the access-layer settings on their own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the pepper is missing or weak, or a numeric
    /// value does not parse. A page size of 0 is rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let ttl_secs: u64 = parse_env("BILEMO_CACHE_TTL_SECS", "3600")?;
        let page_size: u32 = parse_env("BILEMO_PAGE_SIZE", "10")?;
        let page_size = PageSize::new(page_size).map_err(|e| {
            ConfigError::InvalidEnvVar("BILEMO_PAGE_SIZE".to_string(), e.to_string())
        })?;

        Ok(Self {
            cache_ttl: Duration::from_secs(ttl_secs),
            cache_capacity: parse_env("BILEMO_CACHE_CAPACITY", "10000")?,
            page_size,
            token_pepper: get_validated_secret("BILEMO_TOKEN_PEPPER")?,
        })
    }
}

/// Get the database URL with fallback to the generic `DATABASE_URL`.
///
/// Exposed separately so the CLI can run migrations without a token pepper.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    std::env::var("BILEMO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar("BILEMO_DATABASE_URL".to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_PEPPER_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_PEPPER_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
