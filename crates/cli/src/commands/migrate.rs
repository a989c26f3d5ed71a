//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tm-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/store/migrations/`.

use techmart_store::{MIGRATOR, create_pool};

use super::{CommandError, database_url};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
