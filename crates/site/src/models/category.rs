//! Recipe categories.

use serde::Serialize;
use sqlx::FromRow;

use menucochon_core::{CategoryId, Locale};

/// A recipe category (soupes, desserts, plats principaux...).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub position: i32,
}

impl Category {
    /// Category name in the requested locale.
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_fr, self.name_en.as_deref())
    }
}
