//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! French pages live at the root, English pages under `/en` with translated
//! path segments. Both trees share handlers; the locale comes from an
//! `Extension<Locale>` layer on each tree.
//!
//! ```text
//! GET  /  |  /en                                  - Home page
//! GET  /recettes  |  /en/recipes                  - Recipe index (filters in query)
//! GET  /recettes/categorie/{slug}                 - Category page
//! GET  /recette/{slug}  |  /en/recipe/{slug}      - Recipe detail
//! GET  /blogue, /blogue/{slug}                    - Blog
//! GET  /lexique, /lexique/{slug}                  - Lexicon
//! GET  /videos                                    - Videos
//! GET  /boutique, /boutique/{slug}                - Shop
//! GET  /boutique/merci                            - Checkout success
//!
//! GET  /sitemap.xml, /robots.txt
//! GET  /health, /health/ready
//!
//! # JSON API (rate limited)
//! POST /api/newsletter
//! GET  /api/ratings?recipe_id=    POST /api/ratings
//! GET  /api/ingredients/search?q=
//! POST /api/checkout
//! POST /api/webhooks/stripe
//! POST /api/affiliate/click
//! POST /api/track/pageview
//!
//! # Back-office (session required except login)
//! GET/POST /admin/login, POST /admin/logout
//! GET  /admin, /admin/recipes, /admin/orders, /admin/orders/{id}
//! POST /admin/recipes/{id}/publish
//! GET  /admin/analytics, /admin/subscribers.csv
//! ```

pub mod admin;
pub mod api;
pub mod blog;
pub mod health;
pub mod home;
pub mod lexicon;
pub mod recipes;
pub mod seo;
pub mod shop;
pub mod videos;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Datelike, NaiveDate};

use menucochon_core::{Currency, Locale, Price};

use crate::config::AnalyticsConfig;
use crate::filters;
use crate::i18n;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Per-request data every page template needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub locale: Locale,
    pub nonce: String,
    pub base_url: String,
    /// Request path, without query string.
    pub path: String,
    pub analytics: AnalyticsConfig,
    pub currency: Currency,
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let locale = parts
            .extensions
            .get::<Locale>()
            .copied()
            .unwrap_or_else(|| i18n::locale_of_path(&path));
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        let config = state.config();

        Ok(Self {
            locale,
            nonce,
            base_url: config.base_url.clone(),
            path,
            analytics: config.analytics.clone(),
            currency: config.stripe.currency,
        })
    }
}

impl PageContext {
    /// Interface string in the page locale.
    #[must_use]
    pub fn t(&self, key: &'static str) -> &'static str {
        i18n::t(self.locale, key)
    }

    /// Value of the `lang` attribute.
    #[must_use]
    pub const fn lang(&self) -> &'static str {
        match self.locale {
            Locale::Fr => "fr-CA",
            Locale::En => "en-CA",
        }
    }

    #[must_use]
    pub const fn is_english(&self) -> bool {
        matches!(self.locale, Locale::En)
    }

    /// This page in the other language.
    #[must_use]
    pub fn alternate_path(&self) -> String {
        i18n::translate_path(&self.path, self.locale.other())
    }

    #[must_use]
    pub fn canonical_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    #[must_use]
    pub fn french_url(&self) -> String {
        format!("{}{}", self.base_url, i18n::translate_path(&self.path, Locale::Fr))
    }

    #[must_use]
    pub fn english_url(&self) -> String {
        format!("{}{}", self.base_url, i18n::translate_path(&self.path, Locale::En))
    }

    #[must_use]
    pub fn home_path(&self) -> String {
        i18n::home_path(self.locale)
    }

    #[must_use]
    pub fn recipes_path(&self) -> String {
        i18n::recipes_path(self.locale)
    }

    #[must_use]
    pub fn blog_path(&self) -> String {
        i18n::blog_path(self.locale)
    }

    #[must_use]
    pub fn lexicon_path(&self) -> String {
        i18n::lexicon_path(self.locale)
    }

    #[must_use]
    pub fn videos_path(&self) -> String {
        i18n::videos_path(self.locale)
    }

    #[must_use]
    pub fn shop_path(&self) -> String {
        i18n::shop_path(self.locale)
    }

    /// Price in the shop currency, formatted for the page locale.
    #[must_use]
    pub fn price(&self, cents: i64) -> String {
        Price::new(cents, self.currency).format(self.locale)
    }

    #[must_use]
    pub fn date(&self, date: NaiveDate) -> String {
        format_date(self.locale, date)
    }
}

const MONTHS_FR: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// `12 mars 2024` / `March 12, 2024`.
#[must_use]
pub fn format_date(locale: Locale, date: NaiveDate) -> String {
    let month_index = usize::try_from(date.month0()).unwrap_or_default();
    match locale {
        Locale::Fr => {
            let month = MONTHS_FR.get(month_index).copied().unwrap_or_default();
            if date.day() == 1 {
                format!("1er {month} {}", date.year())
            } else {
                format!("{} {month} {}", date.day(), date.year())
            }
        }
        Locale::En => {
            let month = MONTHS_EN.get(month_index).copied().unwrap_or_default();
            format!("{month} {}, {}", date.day(), date.year())
        }
    }
}

/// A page link with its label, for breadcrumbs and pagination.
#[derive(Debug, Clone)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub ctx: PageContext,
}

/// Render the 404 page with a 404 status.
#[must_use]
pub fn not_found(ctx: PageContext) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { ctx }).into_response()
}

/// Router fallback for unknown paths.
async fn fallback(ctx: PageContext) -> Response {
    not_found(ctx)
}

/// Public pages for one locale, mounted at the locale's localized paths.
fn locale_routes(locale: Locale) -> Router<AppState> {
    let slug = "{slug}";

    Router::new()
        .route(&i18n::home_path(locale), get(home::home))
        .route(&i18n::recipes_path(locale), get(recipes::index))
        .route(&i18n::category_path(locale, slug), get(recipes::category))
        .route(&i18n::recipe_path(locale, slug), get(recipes::show))
        .route(&i18n::blog_path(locale), get(blog::index))
        .route(&i18n::post_path(locale, slug), get(blog::show))
        .route(&i18n::lexicon_path(locale), get(lexicon::index))
        .route(&i18n::term_path(locale, slug), get(lexicon::show))
        .route(&i18n::videos_path(locale), get(videos::index))
        .route(&i18n::shop_path(locale), get(shop::index))
        .route(&i18n::checkout_success_path(locale), get(shop::success))
        .route(&i18n::product_path(locale, slug), get(shop::show))
        .layer(Extension(locale))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(locale_routes(Locale::Fr))
        .merge(locale_routes(Locale::En))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/robots.txt", get(seo::robots))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api::routes())
        .nest("/admin", admin::routes())
        .fallback(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(locale: Locale, path: &str) -> PageContext {
        PageContext {
            locale,
            nonce: String::new(),
            base_url: "https://www.menucochon.com".to_string(),
            path: path.to_string(),
            analytics: AnalyticsConfig::default(),
            currency: Currency::Cad,
        }
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap_or_default();
        assert_eq!(format_date(Locale::Fr, date), "12 mars 2024");
        assert_eq!(format_date(Locale::En, date), "March 12, 2024");

        let first = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap_or_default();
        assert_eq!(format_date(Locale::Fr, first), "1er août 2024");
    }

    #[test]
    fn test_alternate_urls() {
        let page = ctx(Locale::Fr, "/recette/tourtiere");
        assert_eq!(page.alternate_path(), "/en/recipe/tourtiere");
        assert_eq!(
            page.english_url(),
            "https://www.menucochon.com/en/recipe/tourtiere"
        );
        assert_eq!(
            page.french_url(),
            "https://www.menucochon.com/recette/tourtiere"
        );
    }

    #[test]
    fn test_price_follows_locale() {
        assert_eq!(ctx(Locale::Fr, "/").price(2499), "24,99 $");
        assert_eq!(ctx(Locale::En, "/en").price(2499), "$24.99");
    }

    #[test]
    fn test_lang() {
        assert_eq!(ctx(Locale::Fr, "/").lang(), "fr-CA");
        assert!(ctx(Locale::En, "/en").is_english());
    }
}
