//! Content importers: blog posts from markdown, lexicon terms from YAML.
//!
//! Both are idempotent: rows are upserted by slug.

use std::path::{Path, PathBuf};

use thiserror::Error;

use menucochon_core::slugify;
use menucochon_site::config::ConfigError;
use menucochon_site::content::{ContentError, apply_translation, parse_post_document};
use menucochon_site::db::{LexiconRepository, NewLexiconTerm, PostRepository, RepositoryError};
use menucochon_site::models::NewPost;

use crate::config::ScriptConfig;

const TRANSLATION_SUFFIX: &str = ".en.md";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Content {
        path: PathBuf,
        source: ContentError,
    },

    #[error("{path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

fn read(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// French post files in `dir`, sorted by name, each with its English sibling if any.
///
/// # Errors
///
/// Returns `ImportError::Io` if the directory cannot be read.
pub fn post_files(dir: &Path) -> Result<Vec<(PathBuf, Option<PathBuf>)>, ImportError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ImportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.extension().is_some_and(|ext| ext == "md")
                && !p
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(TRANSLATION_SUFFIX))
        })
        .collect();
    files.sort();

    Ok(files
        .into_iter()
        .map(|path| {
            let english = path.with_extension("en.md");
            let english = english.is_file().then_some(english);
            (path, english)
        })
        .collect())
}

fn load_post(path: &Path, english: Option<&Path>) -> Result<NewPost, ImportError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let content_error = |source| ImportError::Content {
        path: path.to_path_buf(),
        source,
    };

    let mut post = parse_post_document(stem, &read(path)?).map_err(content_error)?;
    if let Some(english) = english {
        apply_translation(&mut post, &read(english)?).map_err(|source| ImportError::Content {
            path: english.to_path_buf(),
            source,
        })?;
    }
    Ok(post)
}

/// Import every post in `dir`.
///
/// A file that fails to parse is logged and skipped.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a write fails.
pub async fn posts(dir: &Path, dry_run: bool) -> Result<(), ImportError> {
    let files = post_files(dir)?;
    tracing::info!("Found {} post files in {}", files.len(), dir.display());

    let pool = if dry_run {
        None
    } else {
        Some(ScriptConfig::from_env()?.pool().await?)
    };

    let (mut imported, mut skipped) = (0_usize, 0_usize);
    for (path, english) in &files {
        let post = match load_post(path, english.as_deref()) {
            Ok(post) => post,
            Err(e) => {
                tracing::warn!("Skipping {e}");
                skipped += 1;
                continue;
            }
        };

        match &pool {
            Some(pool) => {
                let id = PostRepository::new(pool).upsert(&post).await?;
                tracing::info!(post_id = %id, slug = %post.slug, english = post.body_en.is_some(), "Imported post");
            }
            None => {
                tracing::info!(slug = %post.slug, english = post.body_en.is_some(), draft = post.draft, "[dry run] Would import post");
            }
        }
        imported += 1;
    }

    tracing::info!("Posts done: {imported} imported, {skipped} skipped");
    Ok(())
}

/// Parse a lexicon YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a list of terms.
pub fn load_lexicon(path: &Path) -> Result<Vec<NewLexiconTerm>, ImportError> {
    serde_yaml::from_str(&read(path)?).map_err(|source| ImportError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Slug of a term: explicit, or derived from the French term.
#[must_use]
pub fn term_slug(term: &NewLexiconTerm) -> String {
    term.slug
        .as_deref()
        .map_or_else(|| slugify(&term.term), slugify)
}

/// Import every term of a lexicon file.
///
/// # Errors
///
/// Returns an error if the file is invalid or a write fails.
pub async fn lexicon(path: &Path, dry_run: bool) -> Result<(), ImportError> {
    let terms = load_lexicon(path)?;
    tracing::info!("Found {} terms in {}", terms.len(), path.display());

    let pool = if dry_run {
        None
    } else {
        Some(ScriptConfig::from_env()?.pool().await?)
    };

    let mut imported = 0_usize;
    for term in &terms {
        let slug = term_slug(term);
        if slug.is_empty() || term.definition.trim().is_empty() {
            tracing::warn!("Skipping term {:?}: no slug or empty definition", term.term);
            continue;
        }

        match &pool {
            Some(pool) => {
                LexiconRepository::new(pool).upsert(&slug, term).await?;
            }
            None => tracing::info!(%slug, "[dry run] Would import term"),
        }
        imported += 1;
    }

    tracing::info!("Lexicon done: {imported} of {} terms imported", terms.len());
    Ok(())
}
