//! Newsletter subscriber repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use menucochon_core::{Email, Locale};

use super::RepositoryError;

/// Result of a subscription attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscribed {
    New,
    AlreadySubscribed,
}

/// A subscriber row for the CSV export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscriber {
    pub email: String,
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
}

pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a subscriber; an existing address is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, email))]
    pub async fn subscribe(
        &self,
        email: &Email,
        locale: Locale,
    ) -> Result<Subscribed, RepositoryError> {
        let inserted: Option<(i32,)> = sqlx::query_as(
            r"
            INSERT INTO newsletter_subscribers (email, locale)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            ",
        )
        .bind(email.as_str())
        .bind(locale)
        .fetch_optional(self.pool)
        .await?;

        Ok(if inserted.is_some() {
            Subscribed::New
        } else {
            Subscribed::AlreadySubscribed
        })
    }

    /// Every subscriber, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn export_all(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let rows = sqlx::query_as::<_, Subscriber>(
            "SELECT email, locale, created_at FROM newsletter_subscribers ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
