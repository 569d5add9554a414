//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! food-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `FOOD_APP_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Stored in `crates/api/migrations/` and embedded at compile time.

use food_app_api::config::{ApiConfig, ConfigError};
use food_app_api::db;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails or a
/// migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = ApiConfig::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
