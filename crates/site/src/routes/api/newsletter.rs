//! Newsletter signup.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use menucochon_core::Email;

use crate::db::{NewsletterRepository, Subscribed};
use crate::error::ApiError;
use crate::routes::api::{ApiJson, locale_or_default};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SubscribeResponse {
    pub ok: bool,
    pub already_subscribed: bool,
}

/// Subscribe an email address. Subscribing twice is not an error.
///
/// # Errors
///
/// Returns 400 for an invalid email address, 500 on database failure.
#[instrument(skip(state, request))]
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let email = Email::normalize(&request.email)
        .map_err(|_| ApiError::bad_request("Invalid email address"))?;
    let locale = locale_or_default(request.locale.as_deref());

    let outcome = NewsletterRepository::new(state.pool())
        .subscribe(&email, locale)
        .await?;
    let already_subscribed = outcome == Subscribed::AlreadySubscribed;
    if !already_subscribed {
        info!(domain = email.domain(), %locale, "New newsletter subscriber");
    }

    Ok(Json(SubscribeResponse {
        ok: true,
        already_subscribed,
    }))
}
