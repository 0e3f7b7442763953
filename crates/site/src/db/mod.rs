//! Database operations for the Menucochon `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `categories`, `recipes`, `recipe_ingredients`, `recipe_steps`, `recipe_ratings`
//! - `videos`
//! - `posts`, `lexicon_terms`
//! - `newsletter_subscribers`
//! - `products`, `orders`, `order_items`
//! - `page_views`, `affiliate_clicks`
//! - `admin_users`, `tower_sessions.session`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p menucochon-cli -- migrate
//! ```

pub mod admin_users;
pub mod analytics;
pub mod categories;
pub mod lexicon;
pub mod newsletter;
pub mod orders;
pub mod posts;
pub mod products;
pub mod ratings;
pub mod recipes;
pub mod videos;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use admin_users::AdminUserRepository;
pub use analytics::AnalyticsRepository;
pub use categories::CategoryRepository;
pub use lexicon::{LexiconRepository, NewLexiconTerm};
pub use newsletter::{NewsletterRepository, Subscribed, Subscriber};
pub use orders::{OrderRepository, RefundResult};
pub use posts::PostRepository;
pub use products::ProductRepository;
pub use ratings::RatingRepository;
pub use recipes::{RecipeImageRow, RecipeRepository};
pub use videos::VideoRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, everything else to `Database`.
    pub(crate) fn from_unique(error: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = error
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(error)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
