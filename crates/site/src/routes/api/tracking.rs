//! Beacon endpoints: page views and affiliate link clicks.
//!
//! Both answer 204 at once and write in a spawned task; a failed insert is
//! logged and otherwise lost.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use tracing::{instrument, warn};

use menucochon_core::RecipeId;

use crate::db::AnalyticsRepository;
use crate::error::ApiError;
use crate::routes::api::{ApiJson, locale_or_default, user_agent};
use crate::state::AppState;

const MAX_PATH_LENGTH: usize = 512;
const MAX_URL_LENGTH: usize = 2048;
const MAX_LABEL_LENGTH: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PageViewRequest {
    pub path: String,
    pub locale: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AffiliateClickRequest {
    pub url: String,
    pub recipe_id: Option<i32>,
    pub label: Option<String>,
}

/// A public site path worth counting.
fn validate_path(path: &str) -> Result<&str, ApiError> {
    let path = path.trim();
    let valid = path.starts_with('/')
        && !path.starts_with("//")
        && path.len() <= MAX_PATH_LENGTH
        && !path.starts_with("/admin")
        && !path.starts_with("/api/")
        && !path.chars().any(char::is_control);
    if valid {
        Ok(path)
    } else {
        Err(ApiError::bad_request("Invalid path"))
    }
}

/// An absolute http(s) URL.
fn validate_url(raw: &str) -> Result<String, ApiError> {
    let raw = raw.trim();
    if raw.len() > MAX_URL_LENGTH {
        return Err(ApiError::bad_request("URL too long"));
    }
    let url = url::Url::parse(raw).map_err(|_| ApiError::bad_request("Invalid URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::bad_request("Invalid URL"));
    }
    Ok(url.to_string())
}

fn truncate(value: Option<String>, max: usize) -> Option<String> {
    value
        .map(|v| v.trim().chars().take(max).collect::<String>())
        .filter(|v| !v.is_empty())
}

/// Record a page view.
///
/// # Errors
///
/// Returns 400 for a path outside the public site.
#[instrument(skip_all)]
pub async fn page_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<PageViewRequest>,
) -> Result<StatusCode, ApiError> {
    let path = validate_path(&request.path)?.to_string();
    let locale = locale_or_default(request.locale.as_deref());
    let referrer = truncate(request.referrer, MAX_URL_LENGTH);
    let user_agent = user_agent(&headers);

    let pool = state.pool().clone();
    tokio::spawn(async move {
        if let Err(error) = AnalyticsRepository::new(&pool)
            .record_page_view(&path, locale, referrer.as_deref(), user_agent.as_deref())
            .await
        {
            warn!(%error, "Failed to record page view");
        }
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Record an outbound affiliate click.
///
/// # Errors
///
/// Returns 400 for anything but an absolute http(s) URL.
#[instrument(skip_all)]
pub async fn affiliate_click(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AffiliateClickRequest>,
) -> Result<StatusCode, ApiError> {
    let url = validate_url(&request.url)?;
    let label = truncate(request.label, MAX_LABEL_LENGTH);
    let recipe_id = request.recipe_id.map(RecipeId::new);

    let pool = state.pool().clone();
    tokio::spawn(async move {
        if let Err(error) = AnalyticsRepository::new(&pool)
            .record_affiliate_click(&url, label.as_deref(), recipe_id)
            .await
        {
            warn!(%error, "Failed to record affiliate click");
        }
    });

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/recette/tourtiere").is_ok());
        assert!(validate_path("/en").is_ok());
        assert!(validate_path("recette").is_err());
        assert!(validate_path("//evil.example.com").is_err());
        assert!(validate_path("/admin/orders").is_err());
        assert!(validate_path("/api/track/pageview").is_err());
        assert!(validate_path(&format!("/{}", "a".repeat(600))).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url(" https://www.amazon.ca/dp/B000 ").ok().as_deref(),
            Some("https://www.amazon.ca/dp/B000")
        );
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("/relative").is_err());
        assert!(validate_url("ftp://example.com/file").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(Some("  ".to_string()), 10), None);
        assert_eq!(truncate(Some("Mandoline".to_string()), 4).as_deref(), Some("Mand"));
    }
}
