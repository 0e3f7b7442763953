//! Image generation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{LlmError, build_http_client, check_status};
use crate::config::LlmConfig;

const IMAGE_SIZE: &str = "1024x1024";

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

/// Client for `/images/generations`.
#[derive(Clone)]
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl ImageClient {
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.image_model.clone(),
        })
    }

    /// Generate one square image and return its encoded bytes (PNG).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply carries no image.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, LlmError> {
        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .json(&request)
            .send()
            .await?;
        let response: ImageResponse = check_status(response).await?.json().await?;

        let encoded = response
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or_else(|| LlmError::InvalidResponse("no image in response".to_string()))?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| LlmError::InvalidResponse(format!("invalid base64 image: {e}")))?;

        info!(bytes = bytes.len(), "Image generated");
        Ok(bytes)
    }
}

/// Prompt for a recipe photo.
#[must_use]
pub fn recipe_photo_prompt(title: &str, description: Option<&str>) -> String {
    let mut prompt = format!(
        "Appetizing overhead food photograph of the Quebec dish \"{title}\", served on rustic \
         tableware, natural window light, shallow depth of field, no text, no people."
    );
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        prompt.push_str(" Context: ");
        prompt.push_str(description.trim());
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_photo_prompt() {
        let p = recipe_photo_prompt("Pouding chômeur", Some("  Dessert de crise. "));
        assert!(p.contains("\"Pouding chômeur\""));
        assert!(p.ends_with("Context: Dessert de crise."));
        assert!(!recipe_photo_prompt("Tarte", Some(" ")).contains("Context"));
    }
}
