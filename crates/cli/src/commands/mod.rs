//! CLI command implementations.
//!
//! Each command connects with `DATABASE_URL`; the logic itself works against
//! any [`Store`](techmart_store::Store) so it can be tested in memory.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

use techmart_store::{PgStore, StoreError, create_pool};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected or could not be hashed.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// No user with this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// Read `DATABASE_URL`, loading `.env` first.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))
}

/// Connect to the application database.
async fn connect() -> Result<PgStore, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(PgStore::new(create_pool(&url).await?))
}
