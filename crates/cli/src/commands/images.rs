//! Recipe image maintenance.
//!
//! - `map`: point each recipe's `image_url` at the matching file already in
//!   the storage bucket (after a bulk upload or a rename).
//! - `resize`: shrink source photos to WebP, optionally uploading them.
//! - `generate`: ask the image model for a photo of recipes that have none.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

use menucochon_site::config::ConfigError;
use menucochon_site::db::{RecipeRepository, RepositoryError};
use menucochon_site::llm::{ImageClient, LlmError, recipe_photo_prompt};
use menucochon_site::storage::{StorageClient, StorageError};

use crate::BatchOptions;
use crate::config::{ScriptConfig, pause};
use crate::matching::match_bucket_file;

const WEBP: &str = "image/webp";
const PNG: &str = "image/png";

/// Extensions `resize` accepts.
const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Link recipes to bucket files.
///
/// # Errors
///
/// Returns an error if listing the bucket or a database write fails.
pub async fn map(prefix: &str, dry_run: bool) -> Result<(), ImageError> {
    let pool = ScriptConfig::from_env()?.pool().await?;
    let storage = StorageClient::new(&ScriptConfig::storage()?);
    let repo = RecipeRepository::new(&pool);

    let prefix = prefix.trim_matches('/');
    let files: Vec<String> = storage
        .list(prefix)
        .await?
        .into_iter()
        .filter(|o| o.id.is_some())
        .map(|o| {
            if prefix.is_empty() {
                o.name
            } else {
                format!("{prefix}/{}", o.name)
            }
        })
        .collect();
    tracing::info!("{} files in bucket {}", files.len(), storage.bucket());

    let (mut updated, mut unchanged, mut unmatched) = (0_usize, 0_usize, 0_usize);
    for recipe in repo.image_rows().await? {
        let Some(file) = match_bucket_file(recipe.image_url.as_deref(), &recipe.slug, &files)
        else {
            tracing::debug!(slug = %recipe.slug, "No bucket file");
            unmatched += 1;
            continue;
        };

        let url = storage.public_url(file);
        if recipe.image_url.as_deref() == Some(url.as_str()) {
            unchanged += 1;
            continue;
        }

        if dry_run {
            tracing::info!(slug = %recipe.slug, %url, "[dry run] Would update image");
        } else {
            repo.update_image_url(recipe.id, &url).await?;
            tracing::info!(slug = %recipe.slug, %url, "Image updated");
        }
        updated += 1;
    }

    tracing::info!("Map done: {updated} updated, {unchanged} unchanged, {unmatched} unmatched");
    Ok(())
}

/// Source images under `src` (a file or a directory), sorted.
///
/// # Errors
///
/// Returns `ImageError::Io` if the directory cannot be read.
pub fn source_images(src: &Path) -> Result<Vec<PathBuf>, ImageError> {
    if src.is_file() {
        return Ok(vec![src.to_path_buf()]);
    }

    let entries = std::fs::read_dir(src).map_err(|source| ImageError::Io {
        path: src.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Downscale to at most `max_width`, keeping the aspect ratio. Narrower
/// images are left alone.
#[must_use]
pub fn fit_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    if img.width() <= max_width || max_width == 0 {
        return img;
    }
    let height = u64::from(img.height()) * u64::from(max_width) / u64::from(img.width());
    let height = u32::try_from(height).unwrap_or(u32::MAX).max(1);
    img.resize(max_width, height, FilterType::Lanczos3)
}

/// Encode as WebP.
///
/// # Errors
///
/// Returns the encoder error.
pub fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Cursor::new(Vec::new());
    // The WebP encoder only takes 8-bit RGB(A).
    DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut bytes, ImageFormat::WebP)?;
    Ok(bytes.into_inner())
}

fn resize_one(path: &Path, max_width: u32) -> Result<Vec<u8>, ImageError> {
    let image_error = |source| ImageError::Image {
        path: path.to_path_buf(),
        source,
    };
    let img = ImageReader::open(path)
        .map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(image_error)?;
    encode_webp(&fit_width(img, max_width)).map_err(image_error)
}

/// Resize every source image into `out` as `<stem>.webp`.
///
/// A file that fails to decode is logged and skipped.
///
/// # Errors
///
/// Returns an error if `out` cannot be written or an upload fails.
pub async fn resize(src: &Path, out: &Path, width: u32, upload: bool) -> Result<(), ImageError> {
    let files = source_images(src)?;
    std::fs::create_dir_all(out).map_err(|source| ImageError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    let storage = if upload {
        Some(StorageClient::new(&ScriptConfig::storage()?))
    } else {
        None
    };
    tracing::info!("Resizing {} images to {}px", files.len(), width);

    let (mut done, mut failed) = (0_usize, 0_usize);
    for path in &files {
        let bytes = match resize_one(path, width) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping {e}");
                failed += 1;
                continue;
            }
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let name = format!("{stem}.webp");
        let target = out.join(&name);
        std::fs::write(&target, &bytes).map_err(|source| ImageError::Io {
            path: target.clone(),
            source,
        })?;

        if let Some(storage) = &storage {
            let url = storage.upload(&name, bytes, WEBP).await?;
            tracing::info!(file = %target.display(), %url, "Resized and uploaded");
        } else {
            tracing::info!(file = %target.display(), "Resized");
        }
        done += 1;
    }

    tracing::info!("Resize done: {done} written, {failed} failed");
    Ok(())
}

/// Generate and store a photo for recipes without an image.
///
/// # Errors
///
/// Returns an error if configuration is missing or the database fails.
pub async fn generate(options: BatchOptions) -> Result<(), ImageError> {
    let pool = ScriptConfig::from_env()?.pool().await?;
    let repo = RecipeRepository::new(&pool);
    let recipes = repo.without_image(options.limit).await?;
    tracing::info!("{} recipes without an image", recipes.len());

    if options.dry_run {
        for recipe in &recipes {
            tracing::info!(slug = %recipe.slug, "[dry run] Would generate an image");
        }
        return Ok(());
    }

    let client = ImageClient::new(&ScriptConfig::openai()?)?;
    let storage = StorageClient::new(&ScriptConfig::storage()?);

    let (mut done, mut failed) = (0_usize, 0_usize);
    for (index, recipe) in recipes.iter().enumerate() {
        if index > 0 {
            pause(options.delay_ms).await;
        }

        let prompt = recipe_photo_prompt(&recipe.title_fr, None);
        let bytes = match client.generate(&prompt).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(slug = %recipe.slug, "Generation failed: {e}");
                failed += 1;
                continue;
            }
        };

        let url = storage
            .upload(&format!("generated/{}.png", recipe.slug), bytes, PNG)
            .await?;
        repo.update_image_url(recipe.id, &url).await?;
        tracing::info!(slug = %recipe.slug, %url, "Image generated");
        done += 1;
    }

    tracing::info!("Generate done: {done} generated, {failed} failed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::RgbImage;

    use super::*;

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40])))
    }

    #[test]
    fn test_fit_width_downscales() {
        let img = fit_width(sample(2400, 1600), 1200);
        assert_eq!((img.width(), img.height()), (1200, 800));
    }

    #[test]
    fn test_fit_width_keeps_small_images() {
        let img = fit_width(sample(800, 600), 1200);
        assert_eq!((img.width(), img.height()), (800, 600));
    }

    #[test]
    fn test_encode_webp_signature() {
        let bytes = encode_webp(&sample(16, 16)).unwrap();
        assert_eq!(bytes.get(..4), Some(&b"RIFF"[..]));
        assert_eq!(bytes.get(8..12), Some(&b"WEBP"[..]));
    }

    #[test]
    fn test_source_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.JPG", "a.png", "notes.txt", "c.webp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names: Vec<String> = source_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.webp"]);
    }

    #[test]
    fn test_resize_one_writes_webp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tourtiere.png");
        sample(64, 32).save(&path).unwrap();

        let bytes = resize_one(&path, 32).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }
}
