//! Video repository.

use sqlx::PgPool;

use menucochon_core::RecipeId;

use super::RepositoryError;
use crate::models::Video;

const VIDEO_COLUMNS: &str = "id, recipe_id, youtube_id, title_fr, title_en, published_at";

pub struct VideoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VideoRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Latest published videos.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self, limit: i64) -> Result<Vec<Video>, RepositoryError> {
        let rows = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos
             WHERE published
             ORDER BY published_at DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Latest published video attached to a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_recipe(&self, recipe_id: RecipeId) -> Result<Option<Video>, RepositoryError> {
        let row = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos
             WHERE published AND recipe_id = $1
             ORDER BY published_at DESC
             LIMIT 1"
        ))
        .bind(recipe_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
