//! "What's in my fridge" ingredient search.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::i18n;
use crate::routes::api::{ApiQuery, locale_or_default};
use crate::search::{IngredientMatch, parse_query, rank_recipes};
use crate::state::AppState;

/// Maximum recipes returned.
const RESULT_LIMIT: usize = 24;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub locale: Option<String>,
}

/// A match with the recipe URL in the requested language.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub recipe: IngredientMatch,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub terms: Vec<String>,
    pub results: Vec<SearchResult>,
}

/// Rank published recipes by the ingredients they share with the query.
///
/// # Errors
///
/// Returns 400 for an empty query, 500 if the index cannot be loaded.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let terms = parse_query(&query.q).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let locale = locale_or_default(query.locale.as_deref());

    let index = state.search_index().await?;
    let results = rank_recipes(&index, &terms, locale, RESULT_LIMIT)
        .into_iter()
        .map(|recipe| SearchResult {
            url: i18n::recipe_path(locale, &recipe.slug),
            recipe,
        })
        .collect();

    Ok(Json(SearchResponse { terms, results }))
}
