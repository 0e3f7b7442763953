//! Back-office login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{LOGIN_PATH, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
}

/// Message for a login error code carried in the query string.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Courriel ou mot de passe invalide.",
        "session" => "Impossible d'ouvrir la session. Réessayez.",
        _ => "Une erreur est survenue.",
    }
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle the login form.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Redirect::to(&format!("{LOGIN_PATH}?error=credentials")).into_response();
        }
        Err(e) => {
            warn!(error = %e, "Admin login failed");
            return Redirect::to(&format!("{LOGIN_PATH}?error=failed")).into_response();
        }
    };

    let admin = CurrentAdmin {
        id: user.id,
        email: user.email,
        name: user.name,
    };
    if let Err(e) = set_current_admin(&session, &admin).await {
        error!(error = %e, "Failed to set admin session");
        return Redirect::to(&format!("{LOGIN_PATH}?error=session")).into_response();
    }

    set_sentry_user(&admin.id, Some(admin.email.as_str()));
    info!(admin_id = %admin.id, "Admin logged in");
    Redirect::to("/admin").into_response()
}

/// Logout and clear the session.
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        warn!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();
    Redirect::to(LOGIN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(error_message("credentials"), "Courriel ou mot de passe invalide.");
        assert_eq!(error_message("anything"), "Une erreur est survenue.");
    }
}
