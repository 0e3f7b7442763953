//! Page view and affiliate click storage.

use sqlx::PgPool;

use menucochon_core::{Locale, RecipeId};

use super::RepositoryError;
use crate::models::{AffiliateCount, DailyViews, PageCount};

pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_page_view(
        &self,
        path: &str,
        locale: Locale,
        referrer: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO page_views (path, locale, referrer, user_agent) VALUES ($1, $2, $3, $4)",
        )
        .bind(path)
        .bind(locale)
        .bind(referrer)
        .bind(user_agent)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_affiliate_click(
        &self,
        url: &str,
        label: Option<&str>,
        recipe_id: Option<RecipeId>,
    ) -> Result<(), RepositoryError> {
        // A stale recipe id must not lose the click.
        sqlx::query(
            r"
            INSERT INTO affiliate_clicks (url, label, recipe_id)
            VALUES ($1, $2, (SELECT id FROM recipes WHERE id = $3))
            ",
        )
        .bind(url)
        .bind(label)
        .bind(recipe_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Most viewed paths over the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_pages(&self, days: i32, limit: i64) -> Result<Vec<PageCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, PageCount>(
            r"
            SELECT path, COUNT(*) AS views
            FROM page_views
            WHERE created_at >= NOW() - make_interval(days => $1)
            GROUP BY path
            ORDER BY views DESC, path
            LIMIT $2
            ",
        )
        .bind(days)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Views per day over the last `days` days, oldest first.
    ///
    /// Days without views are absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_views(&self, days: i32) -> Result<Vec<DailyViews>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyViews>(
            r"
            SELECT (created_at AT TIME ZONE 'America/Toronto')::DATE AS day, COUNT(*) AS views
            FROM page_views
            WHERE created_at >= NOW() - make_interval(days => $1)
            GROUP BY day
            ORDER BY day
            ",
        )
        .bind(days)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Clicks per affiliate link over the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn affiliate_summary(
        &self,
        days: i32,
        limit: i64,
    ) -> Result<Vec<AffiliateCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, AffiliateCount>(
            r"
            SELECT url, MAX(label) AS label, COUNT(*) AS clicks
            FROM affiliate_clicks
            WHERE created_at >= NOW() - make_interval(days => $1)
            GROUP BY url
            ORDER BY clicks DESC, url
            LIMIT $2
            ",
        )
        .bind(days)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
