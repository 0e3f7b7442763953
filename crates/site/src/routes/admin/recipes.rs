//! Back-office recipe list and publish toggle.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::{info, instrument};

use menucochon_core::{Locale, RecipeId};

use crate::db::RecipeRepository;
use crate::error::Result;
use crate::filters;
use crate::i18n;
use crate::middleware::RequireAdmin;
use crate::models::RecipeSummary;
use crate::routes::admin::{AdminView, format_timestamp};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PublishForm {
    pub published: bool,
    /// List page to come back to.
    pub page: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RecipeRow {
    pub id: i32,
    pub title: String,
    pub href: String,
    pub translated: bool,
    pub published: bool,
    pub created_at: String,
}

impl From<&RecipeSummary> for RecipeRow {
    fn from(recipe: &RecipeSummary) -> Self {
        Self {
            id: recipe.id.as_i32(),
            title: recipe.title_fr.clone(),
            href: i18n::recipe_path(Locale::Fr, &recipe.slug),
            translated: recipe
                .title_en
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty()),
            published: recipe.published,
            created_at: format_timestamp(recipe.created_at),
        }
    }
}

/// Recipe list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/recipes.html")]
pub struct RecipesTemplate {
    pub admin: AdminView,
    pub current_path: &'static str,
    pub recipes: Vec<RecipeRow>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
}

/// Paginated list of every recipe, drafts included.
///
/// # Errors
///
/// Returns an error if the recipes cannot be loaded.
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = RecipeRepository::new(state.pool())
        .list_admin(query.page.unwrap_or(1))
        .await?;

    Ok(RecipesTemplate {
        admin: AdminView::from(&admin),
        current_path: "/admin/recipes",
        recipes: page.recipes.iter().map(RecipeRow::from).collect(),
        total: page.total,
        total_pages: page.total_pages(),
        page: page.page,
    })
}

/// Publish or unpublish a recipe, then drop cached listings.
///
/// # Errors
///
/// Returns 404 for an unknown recipe.
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn publish(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<PublishForm>,
) -> Result<impl IntoResponse> {
    RecipeRepository::new(state.pool())
        .set_published(RecipeId::new(id), form.published)
        .await?;
    state.invalidate_cache().await;
    info!(recipe_id = id, published = form.published, "Recipe visibility changed");

    let page = form.page.unwrap_or(1).max(1);
    Ok(Redirect::to(&format!("/admin/recipes?page={page}")))
}
