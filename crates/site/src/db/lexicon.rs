//! Lexicon repository.
//!
//! Letters are computed in Rust from the localized term, since English terms
//! fall back to French and accents must fold (`Émincer` files under `E`).

use sqlx::PgPool;
use tracing::instrument;

use menucochon_core::{Locale, LexiconTermId};

use super::RepositoryError;
use crate::models::LexiconTerm;

const TERM_COLUMNS: &str =
    "id, slug, term_fr, term_en, definition_fr, definition_en, updated_at";

/// A lexicon entry as read from an import file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct NewLexiconTerm {
    #[serde(default)]
    pub slug: Option<String>,
    pub term: String,
    #[serde(default)]
    pub term_en: Option<String>,
    pub definition: String,
    #[serde(default)]
    pub definition_en: Option<String>,
}

/// Repository for lexicon terms.
pub struct LexiconRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LexiconRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every term, sorted by French term.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<LexiconTerm>, RepositoryError> {
        let rows = sqlx::query_as::<_, LexiconTerm>(&format!(
            "SELECT {TERM_COLUMNS} FROM lexicon_terms ORDER BY term_fr"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Distinct index letters in this locale, sorted with `#` last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn letters(&self, locale: Locale) -> Result<Vec<char>, RepositoryError> {
        let mut letters: Vec<char> = self
            .list_all()
            .await?
            .iter()
            .map(|t| t.letter(locale))
            .collect();
        letters.sort_unstable_by_key(|c| (*c == '#', *c));
        letters.dedup();
        Ok(letters)
    }

    /// Terms under one index letter, sorted by localized term.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_letter(
        &self,
        locale: Locale,
        letter: char,
    ) -> Result<Vec<LexiconTerm>, RepositoryError> {
        let letter = letter.to_ascii_uppercase();
        let mut terms: Vec<LexiconTerm> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|t| t.letter(locale) == letter)
            .collect();
        terms.sort_by_cached_key(|t| menucochon_core::fold_accents(t.term(locale)).to_lowercase());
        Ok(terms)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<LexiconTerm>, RepositoryError> {
        let row = sqlx::query_as::<_, LexiconTerm>(&format!(
            "SELECT {TERM_COLUMNS} FROM lexicon_terms WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a term or replace the one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, term))]
    pub async fn upsert(
        &self,
        slug: &str,
        term: &NewLexiconTerm,
    ) -> Result<LexiconTermId, RepositoryError> {
        let (id,): (LexiconTermId,) = sqlx::query_as(
            r"
            INSERT INTO lexicon_terms (slug, term_fr, term_en, definition_fr, definition_en)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO UPDATE SET
                term_fr = EXCLUDED.term_fr,
                term_en = EXCLUDED.term_en,
                definition_fr = EXCLUDED.definition_fr,
                definition_en = EXCLUDED.definition_en,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(slug)
        .bind(term.term.trim())
        .bind(term.term_en.as_deref().map(str::trim))
        .bind(term.definition.trim())
        .bind(term.definition_en.as_deref().map(str::trim))
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Slugs and last update of every term, for the sitemap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_slugs(
        &self,
    ) -> Result<Vec<(String, chrono::DateTime<chrono::Utc>)>, RepositoryError> {
        let rows = sqlx::query_as("SELECT slug, updated_at FROM lexicon_terms ORDER BY slug")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}
