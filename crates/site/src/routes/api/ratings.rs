//! Recipe ratings.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::instrument;

use menucochon_core::{Rating, RatingSummary, RecipeId};

use crate::db::RatingRepository;
use crate::error::ApiError;
use crate::routes::api::{ApiJson, ApiQuery, client_ip, user_agent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub recipe_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub recipe_id: i32,
    pub rating: i64,
}

/// Average and count for one recipe.
///
/// # Errors
///
/// Returns 500 on database failure.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<RatingSummary>, ApiError> {
    let summary = RatingRepository::new(state.pool())
        .summary(RecipeId::new(query.recipe_id))
        .await?;
    Ok(Json(summary))
}

/// Record a rating and return the updated summary.
///
/// # Errors
///
/// Returns 400 for a rating outside 1-5, 404 for an unknown recipe.
#[instrument(skip(state, headers, request), fields(recipe_id = request.recipe_id))]
pub async fn rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RateRequest>,
) -> Result<(StatusCode, Json<RatingSummary>), ApiError> {
    let rating = Rating::new(request.rating)
        .map_err(|_| ApiError::bad_request("rating must be between 1 and 5"))?;
    let recipe_id = RecipeId::new(request.recipe_id);
    let fingerprint = fingerprint(client_ip(&headers).as_deref(), user_agent(&headers).as_deref());

    let ratings = RatingRepository::new(state.pool());
    ratings
        .insert(recipe_id, rating, fingerprint.as_deref())
        .await?;
    let summary = ratings.summary(recipe_id).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Anonymous voter fingerprint: a hash of address and user agent, never
/// the raw values.
fn fingerprint(ip: Option<&str>, user_agent: Option<&str>) -> Option<String> {
    let ip = ip?;
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.unwrap_or_default().as_bytes());
    let digest = hasher.finalize();
    Some(hex::encode(digest.get(..16).unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint() {
        let a = fingerprint(Some("203.0.113.5"), Some("Firefox"));
        let b = fingerprint(Some("203.0.113.5"), Some("Firefox"));
        let c = fingerprint(Some("203.0.113.5"), Some("Safari"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_deref().map(str::len), Some(32));
        assert!(!a.unwrap_or_default().contains("203"));
        assert_eq!(fingerprint(None, Some("Firefox")), None);
    }
}
