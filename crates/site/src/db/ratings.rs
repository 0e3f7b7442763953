//! Recipe rating repository.

use sqlx::PgPool;
use tracing::instrument;

use menucochon_core::{Rating, RatingSummary, RecipeId};

use super::RepositoryError;

pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Average and count of a recipe's ratings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, recipe_id: RecipeId) -> Result<RatingSummary, RepositoryError> {
        let (sum, count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(rating), 0)::BIGINT, COUNT(*) FROM recipe_ratings WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_one(self.pool)
        .await?;
        Ok(RatingSummary::from_totals(sum, count))
    }

    /// Store one rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, fingerprint))]
    pub async fn insert(
        &self,
        recipe_id: RecipeId,
        rating: Rating,
        fingerprint: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO recipe_ratings (recipe_id, rating, fingerprint) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(i16::from(rating.value()))
        .bind(fingerprint)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }
}
