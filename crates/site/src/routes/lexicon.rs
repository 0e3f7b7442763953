//! Culinary lexicon: letter index and term detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::content::render_markdown;
use crate::db::LexiconRepository;
use crate::error::Result;
use crate::filters;
use crate::i18n;
use crate::routes::{Link, PageContext, not_found};
use crate::state::AppState;

/// Letter selection, `?lettre=B` (or `?letter=B`).
#[derive(Debug, Deserialize)]
pub struct LetterQuery {
    #[serde(alias = "letter")]
    pub lettre: Option<String>,
}

/// Letter in the index bar.
#[derive(Debug, Clone)]
pub struct LetterLink {
    pub letter: char,
    pub href: String,
    pub active: bool,
}

/// Term row on the index page.
#[derive(Debug, Clone)]
pub struct TermCard {
    pub term: String,
    pub href: String,
    pub excerpt: String,
}

/// Lexicon index template.
#[derive(Template, WebTemplate)]
#[template(path = "lexicon/index.html")]
pub struct LexiconIndexTemplate {
    pub ctx: PageContext,
    pub letters: Vec<LetterLink>,
    pub current: Option<char>,
    pub terms: Vec<TermCard>,
}

/// Term detail template.
#[derive(Template, WebTemplate)]
#[template(path = "lexicon/show.html")]
pub struct LexiconShowTemplate {
    pub ctx: PageContext,
    pub term: String,
    /// Name in the other language, when it differs.
    pub translation: Option<String>,
    pub definition_html: String,
    pub breadcrumbs: Vec<Link>,
}

/// First sentence-ish of a definition, cut on a char boundary.
fn excerpt(definition: &str, max_chars: usize) -> String {
    let trimmed = definition.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(space) => format!("{}…", cut.get(..space).unwrap_or(&cut)),
        None => format!("{cut}…"),
    }
}

/// Display the lexicon for one letter (the first available by default).
///
/// # Errors
///
/// Returns an error if the lexicon cannot be loaded.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<LetterQuery>,
) -> Result<impl IntoResponse> {
    let locale = ctx.locale;
    let letters = state.lexicon_letters(locale).await?;

    let requested = query
        .lettre
        .as_deref()
        .and_then(|l| l.trim().chars().next())
        .map(|c| c.to_ascii_uppercase());
    let current = requested
        .filter(|c| letters.contains(c))
        .or_else(|| letters.first().copied());

    let terms = match current {
        Some(letter) => LexiconRepository::new(state.pool())
            .list_by_letter(locale, letter)
            .await?
            .iter()
            .map(|t| TermCard {
                term: t.term(locale).to_string(),
                href: i18n::term_path(locale, &t.slug),
                excerpt: excerpt(t.definition(locale), 140),
            })
            .collect(),
        None => Vec::new(),
    };

    let base = i18n::lexicon_path(locale);
    let param = if ctx.is_english() { "letter" } else { "lettre" };
    let letters = letters
        .iter()
        .map(|&letter| LetterLink {
            letter,
            href: format!(
                "{base}?{param}={}",
                urlencoding::encode(&letter.to_string())
            ),
            active: Some(letter) == current,
        })
        .collect();

    Ok(LexiconIndexTemplate {
        ctx,
        letters,
        current,
        terms,
    })
}

/// Display one lexicon term.
///
/// # Errors
///
/// Returns an error if the query fails. Unknown slugs get the 404 page.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<Response> {
    let Some(term) = LexiconRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
    else {
        return Ok(not_found(ctx));
    };
    let locale = ctx.locale;

    let name = term.term(locale).to_string();
    let other = term.term(locale.other());
    let translation = (other != name).then(|| other.to_string());

    let breadcrumbs = vec![
        Link {
            label: ctx.t("nav.home").to_string(),
            href: i18n::home_path(locale),
        },
        Link {
            label: ctx.t("nav.lexicon").to_string(),
            href: i18n::lexicon_path(locale),
        },
    ];

    Ok(LexiconShowTemplate {
        term: name,
        translation,
        definition_html: render_markdown(term.definition(locale)),
        breadcrumbs,
        ctx,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  Court.  ", 20), "Court.");
        assert_eq!(
            excerpt("Cuire doucement dans un liquide frémissant", 20),
            "Cuire doucement…"
        );
        assert_eq!(excerpt("Abaisser", 3), "Aba…");
    }
}
