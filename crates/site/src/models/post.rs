//! Blog posts.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use menucochon_core::{Locale, PostId};

/// Posts shown per blog index page.
pub const POSTS_PER_PAGE: u32 = 9;

/// A blog post; bodies are markdown.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: PostId,
    pub slug: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub description_fr: Option<String>,
    pub description_en: Option<String>,
    pub body_fr: String,
    pub body_en: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub published_at: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    #[must_use]
    pub fn title(&self, locale: Locale) -> &str {
        locale.pick(&self.title_fr, self.title_en.as_deref())
    }

    #[must_use]
    pub fn description(&self, locale: Locale) -> Option<String> {
        locale.pick_opt(self.description_fr.as_deref(), self.description_en.as_deref())
    }

    #[must_use]
    pub fn body(&self, locale: Locale) -> &str {
        locale.pick(&self.body_fr, self.body_en.as_deref())
    }
}

/// A post as parsed from a markdown file, ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub slug: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub description_fr: Option<String>,
    pub description_en: Option<String>,
    pub body_fr: String,
    pub body_en: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub published_at: NaiveDate,
}
