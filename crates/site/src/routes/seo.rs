//! `sitemap.xml` and `robots.txt`.

use std::fmt::Write as _;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use tracing::instrument;

use menucochon_core::Locale;

use crate::db::{LexiconRepository, PostRepository, ProductRepository, RecipeRepository};
use crate::error::Result;
use crate::i18n;
use crate::state::AppState;

/// One page in both languages.
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub fr_path: String,
    pub en_path: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl SitemapEntry {
    fn new(path: impl Fn(Locale) -> String, last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            fr_path: path(Locale::Fr),
            en_path: path(Locale::En),
            last_modified,
        }
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render a sitemap with one `<url>` per page and language, each carrying
/// `hreflang` alternates for both.
#[must_use]
pub fn render_sitemap(base_url: &str, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    for entry in entries {
        let fr = xml_escape(&format!("{base_url}{}", entry.fr_path));
        let en = xml_escape(&format!("{base_url}{}", entry.en_path));
        for loc in [&fr, &en] {
            let _ = writeln!(xml, "  <url>\n    <loc>{loc}</loc>");
            if let Some(modified) = entry.last_modified {
                let _ = writeln!(xml, "    <lastmod>{}</lastmod>", modified.format("%Y-%m-%d"));
            }
            let _ = writeln!(
                xml,
                "    <xhtml:link rel=\"alternate\" hreflang=\"fr\" href=\"{fr}\"/>\n    \
                 <xhtml:link rel=\"alternate\" hreflang=\"en\" href=\"{en}\"/>\n  </url>"
            );
        }
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Serve the sitemap for both locales.
///
/// # Errors
///
/// Returns an error if any listing query fails.
#[instrument(skip(state))]
pub async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let pool = state.pool();

    let mut entries: Vec<SitemapEntry> = [
        i18n::home_path as fn(Locale) -> String,
        i18n::recipes_path,
        i18n::blog_path,
        i18n::lexicon_path,
        i18n::videos_path,
        i18n::shop_path,
    ]
    .into_iter()
    .map(|path| SitemapEntry::new(path, None))
    .collect();

    for category in state.categories().await?.iter() {
        entries.push(SitemapEntry::new(
            |l| i18n::category_path(l, &category.slug),
            None,
        ));
    }
    for (slug, updated) in RecipeRepository::new(pool).all_slugs().await? {
        entries.push(SitemapEntry::new(|l| i18n::recipe_path(l, &slug), Some(updated)));
    }
    for (slug, updated) in PostRepository::new(pool).all_slugs().await? {
        entries.push(SitemapEntry::new(|l| i18n::post_path(l, &slug), Some(updated)));
    }
    for (slug, updated) in LexiconRepository::new(pool).all_slugs().await? {
        entries.push(SitemapEntry::new(|l| i18n::term_path(l, &slug), Some(updated)));
    }
    for slug in ProductRepository::new(pool).all_slugs().await? {
        entries.push(SitemapEntry::new(|l| i18n::product_path(l, &slug), None));
    }

    let xml = render_sitemap(&state.config().base_url, &entries);
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

/// Serve `robots.txt`: everything public, back-office and API excluded.
pub async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    let body = format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        state.config().base_url
    );
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}
