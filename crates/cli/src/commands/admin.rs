//! Back-office account management.
//!
//! # Usage
//!
//! ```bash
//! MC_ADMIN_PASSWORD='...' mc-cli admin create -e marie@menucochon.com -n "Marie"
//! mc-cli admin create -e marie@menucochon.com -n "Marie" --password '...'
//! ```

use thiserror::Error;

use menucochon_site::config::ConfigError;
use menucochon_site::services::{AuthError, AuthService};

use crate::config::ScriptConfig;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create a new admin account.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns an error for an invalid email, a weak password, an existing
/// account or a database failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    let pool = ScriptConfig::from_env()?.pool().await?;

    tracing::info!("Creating admin account: {}", email);
    let user = AuthService::new(&pool)
        .register(email, name, password)
        .await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id.as_i32())
}
