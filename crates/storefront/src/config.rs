//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CORS_ORIGINS` - Comma-separated origins allowed to call the API
//! - `FULFILLMENT_INTERVAL_SECS` - How often the fulfillment worker runs (default: 60)
//! - `FULFILLMENT_DELAY_SECS` - Age at which processing orders count as delivered (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_FULFILLMENT_INTERVAL_SECS: u64 = 60;
const DEFAULT_FULFILLMENT_DELAY_SECS: u64 = 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Origins allowed to make cross-origin API requests
    pub cors_origins: Vec<String>,
    /// Background order fulfillment
    pub fulfillment: FulfillmentConfig,
    /// Error tracking
    pub sentry: SentryConfig,
}

/// Fulfillment worker timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FulfillmentConfig {
    /// Time between runs.
    pub interval: Duration,
    /// How long an order stays `processing` before it is marked delivered.
    pub delay: Duration,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_FULFILLMENT_INTERVAL_SECS),
            delay: Duration::from_secs(DEFAULT_FULFILLMENT_DELAY_SECS),
        }
    }
}

/// Sentry settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        parse_base_url("STOREFRONT_BASE_URL", &base_url)?;
        let cors_origins = parse_origins(
            "STOREFRONT_CORS_ORIGINS",
            &get_optional_env("STOREFRONT_CORS_ORIGINS").unwrap_or_default(),
        )?;

        let fulfillment = FulfillmentConfig {
            interval: Duration::from_secs(parse_env(
                "FULFILLMENT_INTERVAL_SECS",
                &DEFAULT_FULFILLMENT_INTERVAL_SECS.to_string(),
            )?),
            delay: Duration::from_secs(parse_env(
                "FULFILLMENT_DELAY_SECS",
                &DEFAULT_FULFILLMENT_DELAY_SECS.to_string(),
            )?),
        };
        if fulfillment.interval.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "FULFILLMENT_INTERVAL_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let sentry = SentryConfig {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origins,
            fulfillment,
            sentry,
        })
    }

    /// Settings for running against local services.
    ///
    /// Used by tests and demos that never touch the database URL.
    #[must_use]
    pub fn local() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/techmart"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cors_origins: Vec::new(),
            fulfillment: FulfillmentConfig::default(),
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_optional_env(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an absolute `http(s)` URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a comma-separated origin list, normalising each to `scheme://host[:port]`.
fn parse_origins(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_base_url(key, s).map(|url| url.origin().ascii_serialization()))
        .collect()
}
