//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{PostRepository, RecipeRepository};
use crate::error::Result;
use crate::filters;
use crate::i18n;
use crate::routes::PageContext;
use crate::routes::blog::PostCard;
use crate::routes::recipes::{CategoryLink, RecipeCard};
use crate::state::AppState;

/// Number of recipes in the "latest" grid.
const LATEST_RECIPES: i64 = 6;

/// Number of blog teasers.
const LATEST_POSTS: i64 = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub recipes: Vec<RecipeCard>,
    pub categories: Vec<CategoryLink>,
    pub posts: Vec<PostCard>,
}

/// Display the home page.
///
/// # Errors
///
/// Returns an error if the recipes, categories or posts cannot be loaded.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let locale = ctx.locale;

    let recipes = RecipeRepository::new(state.pool())
        .latest(LATEST_RECIPES)
        .await?
        .iter()
        .map(|r| RecipeCard::new(r, locale))
        .collect();

    let categories = state
        .categories()
        .await?
        .iter()
        .map(|c| CategoryLink {
            name: c.name(locale).to_string(),
            href: i18n::category_path(locale, &c.slug),
            active: false,
        })
        .collect();

    let posts = PostRepository::new(state.pool())
        .recent(LATEST_POSTS, None)
        .await?
        .iter()
        .map(|p| PostCard::new(p, &ctx))
        .collect();

    Ok(HomeTemplate {
        ctx,
        recipes,
        categories,
        posts,
    })
}
