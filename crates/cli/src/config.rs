//! Script configuration.
//!
//! Every script needs the database; the model and storage settings are
//! loaded only by the scripts that use them, so `mc-cli migrate` works
//! without an `OpenAI` key.

use std::time::Duration;

use secrecy::SecretString;
use sqlx::PgPool;

use menucochon_site::config::{ConfigError, LlmConfig, StorageConfig, get_database_url};
use menucochon_site::db::create_pool;

/// Environment shared by all scripts.
#[derive(Debug)]
pub struct ScriptConfig {
    pub database_url: SecretString,
}

impl ScriptConfig {
    /// Load from the environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no database URL is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(Self {
            database_url: get_database_url("MENUCOCHON_DATABASE_URL")?,
        })
    }

    /// Connect to the database.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection fails.
    pub async fn pool(&self) -> Result<PgPool, sqlx::Error> {
        tracing::info!("Connecting to database...");
        create_pool(&self.database_url).await
    }

    /// `OpenAI` settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `OPENAI_API_KEY` is missing.
    pub fn openai() -> Result<LlmConfig, ConfigError> {
        LlmConfig::openai_from_env()
    }

    /// Local model settings.
    #[must_use]
    pub fn local_llm() -> LlmConfig {
        LlmConfig::local_from_env()
    }

    /// Object storage settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORAGE_URL` or `STORAGE_SERVICE_KEY` is missing.
    pub fn storage() -> Result<StorageConfig, ConfigError> {
        StorageConfig::from_env()
    }
}

/// Pause between external calls.
pub async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
