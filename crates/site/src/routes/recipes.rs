//! Recipe route handlers: index with filters, category pages and detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use menucochon_core::{Difficulty, Locale, RatingSummary};

use crate::db::{CategoryRepository, RatingRepository, RecipeRepository, VideoRepository};
use crate::error::Result;
use crate::filters;
use crate::i18n;
use crate::models::{Ingredient, Recipe, RecipeFilter, RecipePage, RecipeSummary, Step};
use crate::routes::{Link, PageContext, not_found};
use crate::state::AppState;

/// Number of related recipes under a recipe.
const RELATED_COUNT: i64 = 3;

/// Recipe card data for grids.
#[derive(Debug, Clone)]
pub struct RecipeCard {
    pub title: String,
    pub href: String,
    pub image_url: Option<String>,
    pub total_minutes: i32,
    pub difficulty: &'static str,
}

impl RecipeCard {
    #[must_use]
    pub fn new(recipe: &RecipeSummary, locale: Locale) -> Self {
        Self {
            title: recipe.title(locale).to_string(),
            href: i18n::recipe_path(locale, &recipe.slug),
            image_url: recipe.image_url.clone(),
            total_minutes: recipe.total_minutes(),
            difficulty: i18n::t(locale, difficulty_key(recipe.difficulty)),
        }
    }
}

/// Category entry in filter bars and the home page.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub name: String,
    pub href: String,
    pub active: bool,
}

/// Option of a `<select>`.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Filter form state, with parameter names in the page language.
#[derive(Debug, Clone)]
pub struct FilterForm {
    pub action: String,
    pub category_param: &'static str,
    pub difficulty_param: &'static str,
    pub time_param: &'static str,
    pub categories: Vec<SelectOption>,
    pub difficulties: Vec<SelectOption>,
    pub max_minutes: String,
    pub query: String,
}

/// Recipe index query string.
///
/// French pages use `categorie`, `difficulte` and `temps_max`; the English
/// names are accepted everywhere. Unparseable values are ignored rather
/// than rejected, since empty form fields are submitted as `name=`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    #[serde(alias = "category")]
    pub categorie: Option<String>,
    #[serde(alias = "difficulty")]
    pub difficulte: Option<String>,
    #[serde(alias = "max_time")]
    pub temps_max: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

impl RecipeQuery {
    /// Lenient conversion into a repository filter.
    #[must_use]
    pub fn to_filter(&self) -> RecipeFilter {
        RecipeFilter {
            category: non_empty(self.categorie.as_deref()),
            difficulty: self
                .difficulte
                .as_deref()
                .and_then(|d| d.parse::<Difficulty>().ok()),
            max_total_minutes: self
                .temps_max
                .as_deref()
                .and_then(|m| m.trim().parse::<i32>().ok())
                .filter(|m| *m > 0),
            query: non_empty(self.q.as_deref()),
            page: self
                .page
                .as_deref()
                .and_then(|p| p.trim().parse::<u32>().ok())
                .unwrap_or(1),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// i18n key of a difficulty label.
#[must_use]
pub const fn difficulty_key(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "difficulty.easy",
        Difficulty::Medium => "difficulty.medium",
        Difficulty::Hard => "difficulty.hard",
    }
}

/// Query string for a listing page, keeping the active filters.
fn page_href(base: &str, locale: Locale, filter: &RecipeFilter, page: u32, with_category: bool) -> String {
    let names = param_names(locale);
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if with_category && let Some(category) = &filter.category {
        query.append_pair(names.0, category);
    }
    if let Some(difficulty) = filter.difficulty {
        query.append_pair(names.1, difficulty.as_str());
    }
    if let Some(minutes) = filter.max_total_minutes {
        query.append_pair(names.2, &minutes.to_string());
    }
    if let Some(q) = &filter.query {
        query.append_pair("q", q);
    }
    if page > 1 {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

const fn param_names(locale: Locale) -> (&'static str, &'static str, &'static str) {
    match locale {
        Locale::Fr => ("categorie", "difficulte", "temps_max"),
        Locale::En => ("category", "difficulty", "max_time"),
    }
}

/// Recipe listing template (index and category pages).
#[derive(Template, WebTemplate)]
#[template(path = "recipes/index.html")]
pub struct RecipesIndexTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub recipes: Vec<RecipeCard>,
    pub total: i64,
    pub form: FilterForm,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub page: u32,
    pub total_pages: u32,
}

/// Display the recipe index.
///
/// # Errors
///
/// Returns an error if the listing query fails.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<RecipeQuery>,
) -> Result<Response> {
    let filter = query.to_filter();
    let heading = ctx.t("recipes.title").to_string();
    let base = i18n::recipes_path(ctx.locale);
    render_listing(&state, ctx, filter, heading, &base, true).await
}

/// Display one category's recipes.
///
/// # Errors
///
/// Returns an error if the listing query fails.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn category(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
    Query(query): Query<RecipeQuery>,
) -> Result<Response> {
    let Some(category) = CategoryRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
    else {
        return Ok(not_found(ctx));
    };

    let mut filter = query.to_filter();
    filter.category = Some(category.slug.clone());
    let heading = category.name(ctx.locale).to_string();
    let base = i18n::category_path(ctx.locale, &category.slug);
    render_listing(&state, ctx, filter, heading, &base, false).await
}

async fn render_listing(
    state: &AppState,
    ctx: PageContext,
    filter: RecipeFilter,
    heading: String,
    base: &str,
    category_in_query: bool,
) -> Result<Response> {
    let locale = ctx.locale;
    let page: RecipePage = RecipeRepository::new(state.pool()).list(&filter).await?;
    let categories = state.categories().await?;
    let names = param_names(locale);

    let form = FilterForm {
        action: i18n::recipes_path(locale),
        category_param: names.0,
        difficulty_param: names.1,
        time_param: names.2,
        categories: categories
            .iter()
            .map(|c| SelectOption {
                value: c.slug.clone(),
                label: c.name(locale).to_string(),
                selected: filter.category.as_deref() == Some(c.slug.as_str()),
            })
            .collect(),
        difficulties: Difficulty::ALL
            .iter()
            .map(|d| SelectOption {
                value: d.as_str().to_string(),
                label: i18n::t(locale, difficulty_key(*d)).to_string(),
                selected: filter.difficulty == Some(*d),
            })
            .collect(),
        max_minutes: filter
            .max_total_minutes
            .map(|m| m.to_string())
            .unwrap_or_default(),
        query: filter.query.clone().unwrap_or_default(),
    };

    let current = page.page;
    let previous = (current > 1)
        .then(|| page_href(base, locale, &filter, current - 1, category_in_query));
    let next = page
        .has_next()
        .then(|| page_href(base, locale, &filter, current + 1, category_in_query));

    Ok(RecipesIndexTemplate {
        heading,
        recipes: page.recipes.iter().map(|r| RecipeCard::new(r, locale)).collect(),
        total: page.total,
        form,
        previous,
        next,
        page: current,
        total_pages: page.total_pages(),
        ctx,
    }
    .into_response())
}

/// Ingredient line for the detail page.
#[derive(Debug, Clone)]
pub struct IngredientView {
    pub quantity: Option<String>,
    pub name: String,
}

/// Embedded video.
#[derive(Debug, Clone)]
pub struct VideoEmbed {
    pub title: String,
    pub embed_url: String,
}

/// Recipe detail data for the template.
#[derive(Debug, Clone)]
pub struct RecipeView {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    pub total_minutes: i32,
    pub servings: i32,
    pub difficulty: &'static str,
}

/// Recipe detail template.
#[derive(Template, WebTemplate)]
#[template(path = "recipes/show.html")]
pub struct RecipeShowTemplate {
    pub ctx: PageContext,
    pub recipe: RecipeView,
    pub breadcrumbs: Vec<Link>,
    pub ingredients: Vec<IngredientView>,
    pub steps: Vec<String>,
    pub rating: RatingSummary,
    pub full_stars: u8,
    pub video: Option<VideoEmbed>,
    pub related: Vec<RecipeCard>,
    pub json_ld: String,
}

/// Display a recipe.
///
/// # Errors
///
/// Returns an error if a query fails. Unknown or unpublished slugs get the
/// 404 page.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<Response> {
    let recipes = RecipeRepository::new(state.pool());
    let Some(recipe) = recipes.get_by_slug(&slug).await? else {
        return Ok(not_found(ctx));
    };
    let locale = ctx.locale;

    let ingredients = recipes.ingredients(recipe.id).await?;
    let steps = recipes.steps(recipe.id).await?;
    let related = recipes.related(&recipe, RELATED_COUNT).await?;
    let rating = RatingRepository::new(state.pool()).summary(recipe.id).await?;
    let video = VideoRepository::new(state.pool())
        .for_recipe(recipe.id)
        .await?;

    let category = match recipe.category_id {
        Some(id) => state.categories().await?.iter().find(|c| c.id == id).cloned(),
        None => None,
    };

    let mut breadcrumbs = vec![
        Link {
            label: ctx.t("nav.home").to_string(),
            href: i18n::home_path(locale),
        },
        Link {
            label: ctx.t("nav.recipes").to_string(),
            href: i18n::recipes_path(locale),
        },
    ];
    if let Some(category) = &category {
        breadcrumbs.push(Link {
            label: category.name(locale).to_string(),
            href: i18n::category_path(locale, &category.slug),
        });
    }

    let json_ld = recipe_json_ld(&recipe, &ingredients, &steps, rating, locale, &ctx.canonical_url());

    Ok(RecipeShowTemplate {
        recipe: RecipeView {
            id: recipe.id.as_i32(),
            title: recipe.title(locale).to_string(),
            description: recipe.description(locale),
            image_url: recipe.image_url.clone(),
            prep_minutes: recipe.prep_minutes,
            cook_minutes: recipe.cook_minutes,
            total_minutes: recipe.total_minutes(),
            servings: recipe.servings,
            difficulty: i18n::t(locale, difficulty_key(recipe.difficulty)),
        },
        breadcrumbs,
        ingredients: ingredients
            .iter()
            .map(|i| IngredientView {
                quantity: i.quantity.clone(),
                name: i.name(locale).to_string(),
            })
            .collect(),
        steps: steps.iter().map(|s| s.body(locale).to_string()).collect(),
        full_stars: rating.full_stars(),
        rating,
        video: video.map(|v| VideoEmbed {
            title: v.title(locale).to_string(),
            embed_url: v.embed_url(),
        }),
        related: related.iter().map(|r| RecipeCard::new(r, locale)).collect(),
        json_ld,
        ctx,
    }
    .into_response())
}

/// ISO 8601 duration for schema.org (`PT1H15M`).
fn iso_duration(minutes: i32) -> String {
    let minutes = minutes.max(0);
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("PT{m}M"),
        (h, 0) => format!("PT{h}H"),
        (h, m) => format!("PT{h}H{m}M"),
    }
}

/// schema.org `Recipe` JSON-LD, safe to embed in a `<script>` element.
#[must_use]
pub fn recipe_json_ld(
    recipe: &Recipe,
    ingredients: &[Ingredient],
    steps: &[Step],
    rating: RatingSummary,
    locale: Locale,
    url: &str,
) -> String {
    let ingredient_lines: Vec<String> = ingredients
        .iter()
        .map(|i| match i.quantity.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => format!("{q} {}", i.name(locale)),
            _ => i.name(locale).to_string(),
        })
        .collect();
    let instructions: Vec<serde_json::Value> = steps
        .iter()
        .map(|s| json!({ "@type": "HowToStep", "text": s.body(locale) }))
        .collect();

    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "Recipe",
        "name": recipe.title(locale),
        "url": url,
        "inLanguage": locale.code(),
        "prepTime": iso_duration(recipe.prep_minutes),
        "cookTime": iso_duration(recipe.cook_minutes),
        "totalTime": iso_duration(recipe.total_minutes()),
        "recipeYield": recipe.servings.to_string(),
        "recipeIngredient": ingredient_lines,
        "recipeInstructions": instructions,
        "datePublished": recipe.created_at.date_naive().to_string(),
    });

    if let Some(description) = recipe.description(locale) {
        data["description"] = json!(description);
    }
    if let Some(image) = &recipe.image_url {
        data["image"] = json!([image]);
    }
    if rating.count > 0 {
        data["aggregateRating"] = json!({
            "@type": "AggregateRating",
            "ratingValue": rating.average,
            "ratingCount": rating.count,
        });
    }

    data.to_string().replace("</", "<\\/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use menucochon_core::RecipeId;

    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            id: RecipeId::new(1),
            slug: "tourtiere".to_string(),
            category_id: None,
            title_fr: "Tourtière du Lac".to_string(),
            title_en: Some("Lac-Saint-Jean meat pie".to_string()),
            description_fr: Some("Un classique </script> des fêtes".to_string()),
            description_en: None,
            image_url: Some("https://cdn.example.com/tourtiere.webp".to_string()),
            prep_minutes: 45,
            cook_minutes: 240,
            servings: 10,
            difficulty: Difficulty::Medium,
            published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_query_to_filter_is_lenient() {
        let query = RecipeQuery {
            categorie: Some(" desserts ".to_string()),
            difficulte: Some("facile".to_string()),
            temps_max: Some(String::new()),
            q: Some("  ".to_string()),
            page: Some("abc".to_string()),
        };
        let filter = query.to_filter();
        assert_eq!(filter.category.as_deref(), Some("desserts"));
        assert_eq!(filter.difficulty, Some(Difficulty::Easy));
        assert_eq!(filter.max_total_minutes, None);
        assert_eq!(filter.query, None);
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn test_query_accepts_english_names() {
        let query: RecipeQuery =
            serde_urlencoded_from("category=soupes&difficulty=hard&max_time=30&page=2");
        let filter = query.to_filter();
        assert_eq!(filter.category.as_deref(), Some("soupes"));
        assert_eq!(filter.difficulty, Some(Difficulty::Hard));
        assert_eq!(filter.max_total_minutes, Some(30));
        assert_eq!(filter.page, 2);
    }

    fn serde_urlencoded_from(qs: &str) -> RecipeQuery {
        let uri: axum::http::Uri = format!("/recettes?{qs}").parse().unwrap();
        Query::<RecipeQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_page_href_keeps_filters() {
        let filter = RecipeFilter {
            category: Some("soupes".to_string()),
            difficulty: Some(Difficulty::Easy),
            max_total_minutes: None,
            query: Some("pois jaunes".to_string()),
            page: 1,
        };
        assert_eq!(
            page_href("/recettes", Locale::Fr, &filter, 2, true),
            "/recettes?categorie=soupes&difficulte=easy&q=pois+jaunes&page=2"
        );
        assert_eq!(
            page_href("/en/recipes/category/soupes", Locale::En, &filter, 1, false),
            "/en/recipes/category/soupes?difficulty=easy&q=pois+jaunes"
        );
    }

    #[test]
    fn test_iso_duration() {
        assert_eq!(iso_duration(45), "PT45M");
        assert_eq!(iso_duration(120), "PT2H");
        assert_eq!(iso_duration(285), "PT4H45M");
    }

    #[test]
    fn test_json_ld() {
        let ingredients = vec![Ingredient {
            position: 1,
            quantity: Some("1 kg".to_string()),
            name_fr: "porc haché".to_string(),
            name_en: None,
        }];
        let steps = vec![Step {
            position: 1,
            body_fr: "Mélanger.".to_string(),
            body_en: Some("Mix.".to_string()),
        }];
        let rating = RatingSummary::from_totals(9, 2);

        let ld = recipe_json_ld(
            &recipe(),
            &ingredients,
            &steps,
            rating,
            Locale::En,
            "https://www.menucochon.com/en/recipe/tourtiere",
        );
        assert!(!ld.contains("</script>"));

        let value: serde_json::Value = serde_json::from_str(&ld).unwrap();
        assert_eq!(value["@type"], "Recipe");
        assert_eq!(value["name"], "Lac-Saint-Jean meat pie");
        assert_eq!(value["totalTime"], "PT4H45M");
        assert_eq!(value["recipeIngredient"][0], "1 kg porc haché");
        assert_eq!(value["recipeInstructions"][0]["text"], "Mix.");
        assert_eq!(value["aggregateRating"]["ratingCount"], 2);
        // French description falls back when no translation exists
        assert_eq!(value["description"], "Un classique </script> des fêtes");
    }

    #[test]
    fn test_json_ld_without_ratings() {
        let ld = recipe_json_ld(&recipe(), &[], &[], RatingSummary::default(), Locale::Fr, "/");
        let value: serde_json::Value = serde_json::from_str(&ld).unwrap();
        assert!(value.get("aggregateRating").is_none());
        assert_eq!(value["name"], "Tourtière du Lac");
    }
}
