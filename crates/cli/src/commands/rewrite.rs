//! Rewrite French recipe descriptions with the local model.
//!
//! ```bash
//! LOCAL_LLM_URL=http://localhost:11434/v1 mc-cli rewrite descriptions --limit 10
//! ```

use thiserror::Error;

use menucochon_site::config::ConfigError;
use menucochon_site::db::{RecipeRepository, RepositoryError};
use menucochon_site::llm::{ChatClient, LlmError};

use crate::BatchOptions;
use crate::config::{ScriptConfig, pause};

/// Rewrites shorter than this share of the original are rejected.
const MIN_LENGTH_RATIO: f64 = 0.5;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),
}

/// Whether a rewrite is usable in place of `original`.
#[must_use]
pub fn acceptable_rewrite(original: &str, rewritten: &str) -> bool {
    let rewritten = rewritten.trim();
    if rewritten.is_empty() || rewritten == original.trim() {
        return false;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = rewritten.chars().count() as f64 / original.trim().chars().count().max(1) as f64;
    ratio >= MIN_LENGTH_RATIO
}

/// Rewrite up to `options.limit` descriptions.
///
/// # Errors
///
/// Returns an error if the database fails.
pub async fn descriptions(options: BatchOptions) -> Result<(), RewriteError> {
    let pool = ScriptConfig::from_env()?.pool().await?;
    let client = ChatClient::new(&ScriptConfig::local_llm())?;
    let repo = RecipeRepository::new(&pool);

    let recipes = repo.with_description(options.limit).await?;
    tracing::info!("Rewriting {} descriptions", recipes.len());

    let (mut done, mut skipped) = (0_usize, 0_usize);
    for (index, recipe) in recipes.iter().enumerate() {
        let Some(original) = recipe.description_fr.as_deref() else {
            continue;
        };
        if index > 0 {
            pause(options.delay_ms).await;
        }

        let rewritten = match client.rewrite(original).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(slug = %recipe.slug, "Rewrite failed: {e}");
                skipped += 1;
                continue;
            }
        };
        if !acceptable_rewrite(original, &rewritten) {
            tracing::warn!(slug = %recipe.slug, "Rewrite rejected");
            skipped += 1;
            continue;
        }

        if options.dry_run {
            tracing::info!(slug = %recipe.slug, "[dry run] {rewritten}");
        } else {
            repo.update_description(recipe.id, rewritten.trim()).await?;
            tracing::info!(slug = %recipe.slug, "Description rewritten");
        }
        done += 1;
    }

    tracing::info!("Rewrite done: {done} rewritten, {skipped} skipped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_rewrite() {
        let original = "Une tourtière comme celle de grand-maman.";
        assert!(acceptable_rewrite(
            original,
            "La tourtière de grand-maman, tout simplement."
        ));
        assert!(!acceptable_rewrite(original, "   "));
        assert!(!acceptable_rewrite(original, original));
        assert!(!acceptable_rewrite(original, "Tourtière."));
    }
}
