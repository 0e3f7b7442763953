//! Clients for OpenAI-compatible APIs.
//!
//! The same chat client talks to `OpenAI` (recipe translation) and to a local
//! inference server (description rewrites); only the base URL, key and model
//! differ.

mod chat;
mod images;

pub use chat::{ChatClient, RecipeTranslation, parse_translation};
pub use images::{ImageClient, recipe_photo_prompt};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::LlmConfig;

/// Errors that can occur when calling a model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client could not be configured.
    #[error("LLM client configuration error: {0}")]
    Config(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with an error status.
    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

/// HTTP client with JSON content type and optional bearer auth preset.
fn build_http_client(config: &LlmConfig) -> Result<reqwest::Client, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = &config.api_key {
        let value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
            .map_err(|_| LlmError::Config("API key is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| LlmError::Config(e.to_string()))
}

/// Fail with the response body when the status is not a success.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        body,
    })
}
