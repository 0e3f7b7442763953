//! Recipes and their ingredients and steps.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use menucochon_core::{CategoryId, Difficulty, Locale, RecipeId};

/// Recipes shown per listing page.
pub const RECIPES_PER_PAGE: u32 = 12;

/// A full recipe row.
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: RecipeId,
    pub slug: String,
    pub category_id: Option<CategoryId>,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub description_fr: Option<String>,
    pub description_en: Option<String>,
    pub image_url: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    pub servings: i32,
    pub difficulty: Difficulty,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    #[must_use]
    pub fn title(&self, locale: Locale) -> &str {
        locale.pick(&self.title_fr, self.title_en.as_deref())
    }

    #[must_use]
    pub fn description(&self, locale: Locale) -> Option<String> {
        locale.pick_opt(self.description_fr.as_deref(), self.description_en.as_deref())
    }

    #[must_use]
    pub const fn total_minutes(&self) -> i32 {
        self.prep_minutes + self.cook_minutes
    }

    /// Whether any English field is missing.
    #[must_use]
    pub fn needs_translation(&self) -> bool {
        self.title_en.as_deref().is_none_or(|t| t.trim().is_empty())
            || (self.description_fr.is_some()
                && self
                    .description_en
                    .as_deref()
                    .is_none_or(|d| d.trim().is_empty()))
    }
}

/// Listing row: enough to render a recipe card.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub slug: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub image_url: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    pub difficulty: Difficulty,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl RecipeSummary {
    #[must_use]
    pub fn title(&self, locale: Locale) -> &str {
        locale.pick(&self.title_fr, self.title_en.as_deref())
    }

    #[must_use]
    pub const fn total_minutes(&self) -> i32 {
        self.prep_minutes + self.cook_minutes
    }
}

/// One ingredient line.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ingredient {
    pub position: i32,
    pub quantity: Option<String>,
    pub name_fr: String,
    pub name_en: Option<String>,
}

impl Ingredient {
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_fr, self.name_en.as_deref())
    }
}

/// One preparation step.
#[derive(Debug, Clone, FromRow)]
pub struct Step {
    pub position: i32,
    pub body_fr: String,
    pub body_en: Option<String>,
}

impl Step {
    #[must_use]
    pub fn body(&self, locale: Locale) -> &str {
        locale.pick(&self.body_fr, self.body_en.as_deref())
    }
}

/// Ingredient names of one published recipe, for ingredient search.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeIngredients {
    pub id: RecipeId,
    pub slug: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub image_url: Option<String>,
    /// French and English ingredient names, in recipe order.
    pub ingredients: Vec<String>,
}

/// Listing filters taken from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub max_total_minutes: Option<i32>,
    pub query: Option<String>,
    /// 1-based page number.
    pub page: u32,
}

impl RecipeFilter {
    /// Page number clamped to at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Row offset of the page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(RECIPES_PER_PAGE)
    }

    /// `ILIKE` pattern for the free-text query, with wildcards escaped.
    #[must_use]
    pub fn query_pattern(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| {
                let escaped = q
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{escaped}%")
            })
    }
}

/// One page of filtered recipes.
#[derive(Debug, Clone)]
pub struct RecipePage {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub page: u32,
}

impl RecipePage {
    /// Number of pages, at least 1.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let per_page = i64::from(RECIPES_PER_PAGE);
        let pages = (self.total + per_page - 1) / per_page;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_offset() {
        let filter = RecipeFilter {
            page: 3,
            ..RecipeFilter::default()
        };
        assert_eq!(filter.offset(), 24);
        assert_eq!(RecipeFilter::default().offset(), 0);
    }

    #[test]
    fn test_query_pattern_escapes_wildcards() {
        let filter = RecipeFilter {
            query: Some(" 100%_pur ".to_string()),
            ..RecipeFilter::default()
        };
        assert_eq!(filter.query_pattern().as_deref(), Some("%100\\%\\_pur%"));

        let blank = RecipeFilter {
            query: Some("   ".to_string()),
            ..RecipeFilter::default()
        };
        assert_eq!(blank.query_pattern(), None);
    }

    #[test]
    fn test_total_pages() {
        let page = |total| RecipePage {
            recipes: Vec::new(),
            total,
            page: 1,
        };
        assert_eq!(page(0).total_pages(), 1);
        assert_eq!(page(12).total_pages(), 1);
        assert_eq!(page(13).total_pages(), 2);
        assert!(page(13).has_next());
        assert!(!page(12).has_next());
    }
}
