//! Blog post repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use menucochon_core::PostId;

use super::RepositoryError;
use crate::models::post::POSTS_PER_PAGE;
use crate::models::{NewPost, Post};

const POST_COLUMNS: &str = "id, slug, title_fr, title_en, description_fr, description_en, \
     body_fr, body_en, author, cover_url, tags, draft, published_at, updated_at";

/// Repository for blog posts.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of non-draft posts, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self, page: u32) -> Result<(Vec<Post>, i64), RepositoryError> {
        let page = page.max(1);
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM posts WHERE NOT draft AND published_at <= CURRENT_DATE",
        )
        .fetch_one(self.pool)
        .await?;

        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE NOT draft AND published_at <= CURRENT_DATE
             ORDER BY published_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(POSTS_PER_PAGE))
        .bind(i64::from(page - 1) * i64::from(POSTS_PER_PAGE))
        .fetch_all(self.pool)
        .await?;

        Ok((posts, total))
    }

    /// Get a published post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE slug = $1 AND NOT draft AND published_at <= CURRENT_DATE"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Latest posts, optionally excluding one (the post being read).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(
        &self,
        limit: i64,
        exclude: Option<PostId>,
    ) -> Result<Vec<Post>, RepositoryError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE NOT draft AND published_at <= CURRENT_DATE
               AND ($2::int IS NULL OR id <> $2)
             ORDER BY published_at DESC, id DESC
             LIMIT $1"
        ))
        .bind(limit)
        .bind(exclude)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a post or replace the one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, post), fields(slug = %post.slug))]
    pub async fn upsert(&self, post: &NewPost) -> Result<PostId, RepositoryError> {
        let (id,): (PostId,) = sqlx::query_as(
            r"
            INSERT INTO posts (slug, title_fr, title_en, description_fr, description_en,
                               body_fr, body_en, author, cover_url, tags, draft, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (slug) DO UPDATE SET
                title_fr = EXCLUDED.title_fr,
                title_en = EXCLUDED.title_en,
                description_fr = EXCLUDED.description_fr,
                description_en = EXCLUDED.description_en,
                body_fr = EXCLUDED.body_fr,
                body_en = EXCLUDED.body_en,
                author = EXCLUDED.author,
                cover_url = EXCLUDED.cover_url,
                tags = EXCLUDED.tags,
                draft = EXCLUDED.draft,
                published_at = EXCLUDED.published_at,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(&post.slug)
        .bind(&post.title_fr)
        .bind(post.title_en.as_deref())
        .bind(post.description_fr.as_deref())
        .bind(post.description_en.as_deref())
        .bind(&post.body_fr)
        .bind(post.body_en.as_deref())
        .bind(post.author.as_deref())
        .bind(post.cover_url.as_deref())
        .bind(&post.tags)
        .bind(post.draft)
        .bind(post.published_at)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Number of published posts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_published(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE NOT draft")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Slugs and last update of published posts, for the sitemap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_slugs(&self) -> Result<Vec<(String, DateTime<Utc>)>, RepositoryError> {
        let rows = sqlx::query_as(
            "SELECT slug, updated_at FROM posts
             WHERE NOT draft AND published_at <= CURRENT_DATE ORDER BY slug",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
