//! Recipe videos (YouTube embeds).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use menucochon_core::{Locale, RecipeId, VideoId};

#[derive(Debug, Clone, FromRow)]
pub struct Video {
    pub id: VideoId,
    pub recipe_id: Option<RecipeId>,
    pub youtube_id: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl Video {
    #[must_use]
    pub fn title(&self, locale: Locale) -> &str {
        locale.pick(&self.title_fr, self.title_en.as_deref())
    }

    /// Privacy-enhanced embed URL.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube-nocookie.com/embed/{}", self.youtube_id)
    }

    #[must_use]
    pub fn thumbnail_url(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.youtube_id)
    }
}
