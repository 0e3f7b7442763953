//! Recipe repository: listing, detail, search index and maintenance updates.

use sqlx::PgPool;
use tracing::instrument;

use menucochon_core::{CategoryId, RecipeId};

use super::RepositoryError;
use crate::models::recipe::RECIPES_PER_PAGE;
use crate::models::{
    Ingredient, Recipe, RecipeFilter, RecipeIngredients, RecipePage, RecipeSummary, Step,
};

const RECIPE_COLUMNS: &str = "r.id, r.slug, r.category_id, r.title_fr, r.title_en, \
     r.description_fr, r.description_en, r.image_url, r.prep_minutes, r.cook_minutes, \
     r.servings, r.difficulty, r.published, r.created_at, r.updated_at";

const SUMMARY_COLUMNS: &str = "r.id, r.slug, r.title_fr, r.title_en, r.image_url, \
     r.prep_minutes, r.cook_minutes, r.difficulty, r.published, r.created_at";

// Shared WHERE clause for the public listing; $1..$4 are the optional filters.
const LIST_FILTER: &str = "
    FROM recipes r
    LEFT JOIN categories c ON c.id = r.category_id
    WHERE r.published
      AND ($1::text IS NULL OR c.slug = $1)
      AND ($2::recipe_difficulty IS NULL OR r.difficulty = $2)
      AND ($3::int IS NULL OR r.prep_minutes + r.cook_minutes <= $3)
      AND ($4::text IS NULL OR r.title_fr ILIKE $4 OR r.title_en ILIKE $4)";

/// Image URL of one recipe, for the image maintenance scripts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeImageRow {
    pub id: RecipeId,
    pub slug: String,
    pub title_fr: String,
    pub image_url: Option<String>,
}

/// Repository for recipe database operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of published recipes matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RecipeFilter) -> Result<RecipePage, RepositoryError> {
        let pattern = filter.query_pattern();

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) {LIST_FILTER}"))
            .bind(filter.category.as_deref())
            .bind(filter.difficulty)
            .bind(filter.max_total_minutes)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let recipes = sqlx::query_as::<_, RecipeSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} {LIST_FILTER}
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $5 OFFSET $6"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.difficulty)
        .bind(filter.max_total_minutes)
        .bind(pattern.as_deref())
        .bind(i64::from(RECIPES_PER_PAGE))
        .bind(filter.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(RecipePage {
            recipes,
            total,
            page: filter.page(),
        })
    }

    /// Latest published recipes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self, limit: i64) -> Result<Vec<RecipeSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipeSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM recipes r
             WHERE r.published
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a published recipe by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Recipe>, RepositoryError> {
        let row = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.slug = $1 AND r.published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Get any recipe by ID, published or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let row = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Ingredients of a recipe in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ingredients(&self, id: RecipeId) -> Result<Vec<Ingredient>, RepositoryError> {
        let rows = sqlx::query_as::<_, Ingredient>(
            r"
            SELECT position, quantity, name_fr, name_en
            FROM recipe_ingredients
            WHERE recipe_id = $1
            ORDER BY position, id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Steps of a recipe in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn steps(&self, id: RecipeId) -> Result<Vec<Step>, RepositoryError> {
        let rows = sqlx::query_as::<_, Step>(
            r"
            SELECT position, body_fr, body_en
            FROM recipe_steps
            WHERE recipe_id = $1
            ORDER BY position, id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Other published recipes of the same category, newest first.
    ///
    /// Returns an empty list for uncategorized recipes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        recipe: &Recipe,
        limit: i64,
    ) -> Result<Vec<RecipeSummary>, RepositoryError> {
        let Some(category_id) = recipe.category_id else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, RecipeSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM recipes r
             WHERE r.published AND r.category_id = $1 AND r.id <> $2
             ORDER BY r.created_at DESC
             LIMIT $3"
        ))
        .bind(category_id)
        .bind(recipe.id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Published recipes in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<RecipeSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipeSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM recipes r
             WHERE r.published AND r.category_id = $1
             ORDER BY r.created_at DESC"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Ingredient names (both languages) of every published recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search_index(&self) -> Result<Vec<RecipeIngredients>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipeIngredients>(
            r"
            SELECT r.id, r.slug, r.title_fr, r.title_en, r.image_url,
                   COALESCE(
                       ARRAY_AGG(n.name ORDER BY n.position) FILTER (WHERE n.name IS NOT NULL),
                       '{}'
                   ) AS ingredients
            FROM recipes r
            LEFT JOIN LATERAL (
                SELECT i.position, i.name_fr AS name FROM recipe_ingredients i WHERE i.recipe_id = r.id
                UNION ALL
                SELECT i.position, i.name_en FROM recipe_ingredients i
                WHERE i.recipe_id = r.id AND i.name_en IS NOT NULL
            ) n ON TRUE
            WHERE r.published
            GROUP BY r.id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Publish or unpublish a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no recipe has this ID.
    #[instrument(skip(self))]
    pub async fn set_published(&self, id: RecipeId, published: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE recipes SET published = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(published)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Every recipe, published or not, newest first, for the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_admin(&self, page: u32) -> Result<RecipePage, RepositoryError> {
        let page = page.max(1);
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
            .fetch_one(self.pool)
            .await?;

        let recipes = sqlx::query_as::<_, RecipeSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM recipes r
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(RECIPES_PER_PAGE))
        .bind(i64::from(page - 1) * i64::from(RECIPES_PER_PAGE))
        .fetch_all(self.pool)
        .await?;

        Ok(RecipePage {
            recipes,
            total,
            page,
        })
    }

    /// Count of published and total recipes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<(i64, i64), RepositoryError> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE published), COUNT(*) FROM recipes",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Recipes with a missing English title or description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn missing_translation(&self, limit: i64) -> Result<Vec<Recipe>, RepositoryError> {
        let rows = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r
             WHERE COALESCE(TRIM(r.title_en), '') = ''
                OR (r.description_fr IS NOT NULL AND COALESCE(TRIM(r.description_en), '') = '')
             ORDER BY r.id
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Store English title and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no recipe has this ID.
    pub async fn update_translation(
        &self,
        id: RecipeId,
        title_en: &str,
        description_en: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE recipes
            SET title_en = $2,
                description_en = COALESCE($3, description_en),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(title_en)
        .bind(description_en)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace the French description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no recipe has this ID.
    pub async fn update_description(
        &self,
        id: RecipeId,
        description_fr: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE recipes SET description_fr = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(description_fr)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Recipes with a French description, for the rewrite script.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn with_description(&self, limit: i64) -> Result<Vec<Recipe>, RepositoryError> {
        let rows = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r
             WHERE COALESCE(TRIM(r.description_fr), '') <> ''
             ORDER BY r.id
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Image URL of every recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn image_rows(&self) -> Result<Vec<RecipeImageRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipeImageRow>(
            "SELECT id, slug, title_fr, image_url FROM recipes ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Recipes that have no image yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn without_image(&self, limit: i64) -> Result<Vec<RecipeImageRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipeImageRow>(
            r"
            SELECT id, slug, title_fr, image_url
            FROM recipes
            WHERE COALESCE(TRIM(image_url), '') = ''
            ORDER BY id
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Point a recipe at a new image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no recipe has this ID.
    pub async fn update_image_url(&self, id: RecipeId, url: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE recipes SET image_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(url)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Slugs and last update of published recipes, for the sitemap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_slugs(
        &self,
    ) -> Result<Vec<(String, chrono::DateTime<chrono::Utc>)>, RepositoryError> {
        let rows = sqlx::query_as(
            "SELECT slug, updated_at FROM recipes WHERE published ORDER BY slug",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
