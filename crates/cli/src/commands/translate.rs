//! Fill in missing English recipe titles and descriptions with `OpenAI`.
//!
//! ```bash
//! OPENAI_API_KEY=... mc-cli translate recipes --limit 20
//! ```
//!
//! An existing English title or description is never overwritten.

use thiserror::Error;

use menucochon_site::config::ConfigError;
use menucochon_site::db::{RecipeRepository, RepositoryError};
use menucochon_site::llm::{ChatClient, LlmError};
use menucochon_site::models::Recipe;

use crate::BatchOptions;
use crate::config::{ScriptConfig, pause};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),
}

/// French description when it still needs an English counterpart.
fn untranslated_description(recipe: &Recipe) -> Option<&str> {
    let has_english = recipe
        .description_en
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    recipe
        .description_fr
        .as_deref()
        .filter(|d| !d.trim().is_empty() && !has_english)
}

/// Translate up to `options.limit` recipes.
///
/// A failed translation is logged and skipped.
///
/// # Errors
///
/// Returns an error if configuration is missing or the database fails.
pub async fn recipes(options: BatchOptions) -> Result<(), TranslateError> {
    let llm = ScriptConfig::openai()?;
    let pool = ScriptConfig::from_env()?.pool().await?;
    let client = ChatClient::new(&llm)?;
    let repo = RecipeRepository::new(&pool);

    let todo = repo.missing_translation(options.limit).await?;
    tracing::info!("{} recipes need a translation", todo.len());

    let (mut done, mut failed) = (0_usize, 0_usize);
    for (index, recipe) in todo.iter().enumerate() {
        if index > 0 {
            pause(options.delay_ms).await;
        }

        let description = untranslated_description(recipe);
        let translation = match client.translate_recipe(&recipe.title_fr, description).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(slug = %recipe.slug, "Translation failed: {e}");
                failed += 1;
                continue;
            }
        };

        let title_en = recipe
            .title_en
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&translation.title);
        let description_en = translation
            .description
            .as_deref()
            .filter(|_| description.is_some())
            .or(recipe.description_en.as_deref());

        if options.dry_run {
            tracing::info!(slug = %recipe.slug, %title_en, "[dry run] Would translate");
        } else {
            repo.update_translation(recipe.id, title_en, description_en)
                .await?;
            tracing::info!(slug = %recipe.slug, %title_en, "Translated");
        }
        done += 1;
    }

    tracing::info!("Translation done: {done} translated, {failed} failed");
    Ok(())
}
