//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mc-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MENUCOCHON_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! `crates/site/migrations/`, embedded at compile time.

use thiserror::Error;

use menucochon_site::config::ConfigError;

use crate::config::ScriptConfig;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = ScriptConfig::from_env()?.pool().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
