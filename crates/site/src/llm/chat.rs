//! Chat completions.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{LlmError, build_http_client, check_status};
use crate::config::LlmConfig;

const TRANSLATE_SYSTEM_PROMPT: &str = "You translate Quebec French recipe content into natural \
Canadian English. Keep ingredient names culinary and idiomatic, keep proper nouns and dish names \
that English speakers use as-is (poutine, tourtière). Answer with a JSON object \
{\"title\": string, \"description\": string or null} and nothing else.";

const REWRITE_SYSTEM_PROMPT: &str = "Tu réécris des descriptions de recettes en français québécois. \
Garde le sens, les faits et la longueur approximative, rends le texte plus chaleureux et plus \
clair. Réponds uniquement avec le texte réécrit, sans guillemets ni commentaire.";

/// English title and description produced by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeTranslation {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `/chat/completions`.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Send one system + user exchange and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is empty.
    #[instrument(skip(self, system, user), fields(model = %self.model, user_len = user.len()))]
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.send(system, user, false).await
    }

    async fn send(&self, system: &str, user: &str, json: bool) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.3,
            response_format: json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await?;
        let response: ChatResponse = check_status(response).await?.json().await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("empty completion".to_string()))?;

        debug!(reply_len = content.len(), "Completion received");
        Ok(content)
    }

    /// Translate a French title and description into English.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is not the expected JSON.
    pub async fn translate_recipe(
        &self,
        title_fr: &str,
        description_fr: Option<&str>,
    ) -> Result<RecipeTranslation, LlmError> {
        let user = serde_json::json!({
            "title": title_fr,
            "description": description_fr,
        })
        .to_string();

        let reply = self.send(TRANSLATE_SYSTEM_PROMPT, &user, true).await?;
        parse_translation(&reply)
    }

    /// Rewrite a French recipe description.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is empty.
    pub async fn rewrite(&self, text: &str) -> Result<String, LlmError> {
        let reply = self.complete(REWRITE_SYSTEM_PROMPT, text).await?;
        Ok(strip_quotes(&reply).to_string())
    }
}

/// Decode a translation reply, tolerating a surrounding code fence.
///
/// # Errors
///
/// Returns `LlmError::InvalidResponse` if the JSON is invalid or the title is blank.
pub fn parse_translation(reply: &str) -> Result<RecipeTranslation, LlmError> {
    let body = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let mut translation: RecipeTranslation = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("translation is not JSON: {e}")))?;

    translation.title = translation.title.trim().to_string();
    if translation.title.is_empty() {
        return Err(LlmError::InvalidResponse("blank title".to_string()));
    }
    translation.description = translation
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    Ok(translation)
}

fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    for (open, close) in [('"', '"'), ('«', '»'), ('“', '”')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|t| t.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    trimmed
}
