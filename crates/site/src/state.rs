//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use menucochon_core::Locale;

use crate::config::SiteConfig;
use crate::db::{CategoryRepository, LexiconRepository, RecipeRepository, RepositoryError};
use crate::models::{Category, RecipeIngredients};
use crate::stripe::StripeClient;

/// Lifetime of cached reference data.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached values, keyed by a string in the shared cache.
#[derive(Clone)]
enum CacheValue {
    Categories(Arc<Vec<Category>>),
    LexiconLetters(Arc<Vec<char>>),
    SearchIndex(Arc<Vec<RecipeIngredients>>),
}

const CATEGORIES_KEY: &str = "categories";
const SEARCH_INDEX_KEY: &str = "search_index";

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    stripe: StripeClient,
    cache: Cache<String, CacheValue>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: SiteConfig, pool: PgPool) -> Self {
        let stripe = StripeClient::new(&config.stripe);
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                cache,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe API client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// All categories, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the categories cannot be loaded.
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(CATEGORIES_KEY).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CategoryRepository::new(self.pool()).list_all().await?);
        self.inner
            .cache
            .insert(
                CATEGORIES_KEY.to_string(),
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// Lexicon index letters for a locale, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the lexicon cannot be loaded.
    pub async fn lexicon_letters(&self, locale: Locale) -> Result<Arc<Vec<char>>, RepositoryError> {
        let key = format!("lexicon_letters:{}", locale.code());
        if let Some(CacheValue::LexiconLetters(letters)) = self.inner.cache.get(&key).await {
            return Ok(letters);
        }

        let letters = Arc::new(LexiconRepository::new(self.pool()).letters(locale).await?);
        self.inner
            .cache
            .insert(key, CacheValue::LexiconLetters(Arc::clone(&letters)))
            .await;
        Ok(letters)
    }

    /// Ingredient names of every published recipe, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the index cannot be loaded.
    pub async fn search_index(&self) -> Result<Arc<Vec<RecipeIngredients>>, RepositoryError> {
        if let Some(CacheValue::SearchIndex(index)) = self.inner.cache.get(SEARCH_INDEX_KEY).await
        {
            return Ok(index);
        }

        let index = Arc::new(RecipeRepository::new(self.pool()).search_index().await?);
        debug!(recipes = index.len(), "Loaded ingredient search index");
        self.inner
            .cache
            .insert(
                SEARCH_INDEX_KEY.to_string(),
                CacheValue::SearchIndex(Arc::clone(&index)),
            )
            .await;
        Ok(index)
    }

    /// Drop cached data after an admin edit.
    pub async fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
