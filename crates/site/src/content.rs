//! Markdown rendering and blog post documents.
//!
//! Posts are stored in the database as markdown and rendered on request.
//! The importer reads them from files with YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: La tourtière du Lac
//! title_en: Lac-Saint-Jean meat pie
//! description: Un classique des fêtes.
//! author: Marie
//! published_at: 2024-12-01
//! tags: [fêtes, viande]
//! cover: https://cdn.example.com/tourtiere.webp
//! ---
//! Corps de l'article...
//! ```
//!
//! A sibling `<name>.en.md` carries the English body (and may override the
//! English title and description).

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

use menucochon_core::slugify;

use crate::models::NewPost;

const WORDS_PER_MINUTE: usize = 200;

/// Frontmatter of a French post file.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default, alias = "featured_image")]
    pub cover: Option<String>,
}

/// Frontmatter of an English translation file; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Render markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Raw HTML in the source is escaped, never passed through.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    options.render.r#unsafe = false;
    options.render.escape = true;

    markdown_to_html(content, &options)
}

/// Estimated reading time at 200 words per minute, at least one minute.
#[must_use]
pub fn reading_time_minutes(markdown: &str) -> u32 {
    let words = markdown.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Slug from a post file stem: `2025-01-15-my-post` becomes `my-post`.
#[must_use]
pub fn slug_from_file_stem(stem: &str) -> String {
    let is_date = stem.get(..10).is_some_and(|prefix| {
        prefix
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() })
    });

    match stem.get(10..).and_then(|rest| rest.strip_prefix('-')) {
        Some(rest) if is_date && !rest.is_empty() => slugify(rest),
        _ => slugify(stem),
    }
}

/// Parse a French post file into a post ready to upsert.
///
/// The slug comes from the frontmatter `slug` when present, otherwise from
/// `file_stem` with any date prefix removed.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the frontmatter is missing or invalid,
/// or if no slug can be derived.
pub fn parse_post_document(file_stem: &str, text: &str) -> Result<NewPost, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PostMeta> = matter
        .parse(text)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    let slug = meta
        .slug
        .as_deref()
        .map_or_else(|| slug_from_file_stem(file_stem), slugify);
    if slug.is_empty() {
        return Err(ContentError::Parse(format!(
            "Cannot derive a slug from {file_stem:?}"
        )));
    }

    let body = parsed.content.trim();
    if body.is_empty() {
        return Err(ContentError::Parse(format!("Post {slug} has an empty body")));
    }

    Ok(NewPost {
        slug,
        title_fr: meta.title.trim().to_string(),
        title_en: non_blank(meta.title_en),
        description_fr: non_blank(meta.description),
        description_en: non_blank(meta.description_en),
        body_fr: body.to_string(),
        body_en: None,
        author: non_blank(meta.author),
        cover_url: non_blank(meta.cover),
        tags: meta
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        draft: meta.draft,
        published_at: meta.published_at,
    })
}

/// Merge an English translation file into a parsed post.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the frontmatter is invalid.
pub fn apply_translation(post: &mut NewPost, text: &str) -> Result<(), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<TranslationMeta> = matter
        .parse(text)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed.data.unwrap_or_default();

    if let Some(title) = non_blank(meta.title) {
        post.title_en = Some(title);
    }
    if let Some(description) = non_blank(meta.description) {
        post.description_en = Some(description);
    }
    post.body_en = non_blank(Some(parsed.content));
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const POST: &str = "---
title: Pâté chinois revisité
title_en: Shepherd's pie, revisited
description: Le classique, en mieux.
published_at: 2024-03-02
tags: [boeuf, ' classique ', '']
---
Un **classique** québécois.
";

    #[test]
    fn test_render_markdown_escapes_raw_html() {
        let html = render_markdown("Hello <script>alert(1)</script> **world**");
        assert!(html.contains("<strong>world</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"mot ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"mot ".repeat(201)), 2);
    }

    #[test]
    fn test_slug_from_file_stem() {
        assert_eq!(slug_from_file_stem("2025-01-15-ma-recette"), "ma-recette");
        assert_eq!(slug_from_file_stem("crêpes-faciles"), "crepes-faciles");
        assert_eq!(slug_from_file_stem("2025-x1-15-pas-une-date"), "2025-x1-15-pas-une-date");
    }

    #[test]
    fn test_parse_post_document() {
        let post = parse_post_document("2024-03-02-pate-chinois", POST).unwrap();
        assert_eq!(post.slug, "pate-chinois");
        assert_eq!(post.title_fr, "Pâté chinois revisité");
        assert_eq!(post.title_en.as_deref(), Some("Shepherd's pie, revisited"));
        assert_eq!(post.tags, vec!["boeuf", "classique"]);
        assert_eq!(post.published_at, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert!(post.body_fr.starts_with("Un **classique**"));
        assert!(!post.draft);
    }

    #[test]
    fn test_parse_post_document_requires_frontmatter() {
        assert!(parse_post_document("x", "Juste du texte").is_err());
    }

    #[test]
    fn test_apply_translation() {
        let mut post = parse_post_document("pate-chinois", POST).unwrap();
        apply_translation(&mut post, "---\ndescription: Better.\n---\nA Quebec **classic**.\n")
            .unwrap();
        assert_eq!(post.title_en.as_deref(), Some("Shepherd's pie, revisited"));
        assert_eq!(post.description_en.as_deref(), Some("Better."));
        assert_eq!(post.body_en.as_deref(), Some("A Quebec **classic**."));
    }
}
