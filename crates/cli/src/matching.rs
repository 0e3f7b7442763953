//! Matching recipes to files in the image bucket.
//!
//! Recipe images were exported from a WordPress media library, so URLs carry
//! size variants (`tarte-1024x768.jpg`), `-scaled` copies and edit suffixes
//! (`-e1589912345`). The bucket holds one file per image under a cleaned
//! name, which may differ in extension.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Normalized stem of a URL or file name.
///
/// Drops the query string, fragment, directories and extension, lowercases,
/// then strips WordPress suffixes until none is left.
#[must_use]
pub fn normalize_stem(name: &str) -> String {
    let name = name
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let mut stem = stem.to_lowercase();

    loop {
        let stripped = strip_wordpress_suffix(&stem);
        if stripped.len() == stem.len() {
            return stem;
        }
        stem = stripped.to_string();
    }
}

/// A stem ending in `-123x456`, `-scaled` or `-e<digits>`.
static WORDPRESS_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)-(?:\d+x\d+|scaled|e\d+)$").expect("Invalid regex")
});

/// Remove one WordPress suffix, keeping a non-empty base.
fn strip_wordpress_suffix(stem: &str) -> &str {
    WORDPRESS_SUFFIX_RE
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .map_or(stem, |base| base.as_str())
}

/// Pick the bucket file for a recipe.
///
/// An exact match on the normalized stem of the current image URL wins;
/// otherwise the first file (in name order) whose normalized stem starts
/// with the recipe slug.
#[must_use]
pub fn match_bucket_file<'a>(
    image_url: Option<&str>,
    slug: &str,
    files: &'a [String],
) -> Option<&'a str> {
    let stems: Vec<(String, &'a str)> = files
        .iter()
        .map(|f| (normalize_stem(f), f.as_str()))
        .collect();

    if let Some(wanted) = image_url
        .map(normalize_stem)
        .filter(|s| !s.is_empty())
        && let Some((_, file)) = stems.iter().find(|(stem, _)| *stem == wanted)
    {
        return Some(file);
    }

    let slug = slug.to_lowercase();
    if slug.is_empty() {
        return None;
    }
    let mut candidates: Vec<&'a str> = stems
        .iter()
        .filter(|(stem, _)| stem.starts_with(&slug))
        .map(|(_, file)| *file)
        .collect();
    candidates.sort_unstable();
    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_normalize_stem() {
        assert_eq!(
            normalize_stem("https://menucochon.com/wp-content/uploads/2020/05/Tarte-Sucre-1024x768.jpg?v=2"),
            "tarte-sucre"
        );
        assert_eq!(normalize_stem("pouding-chomeur-scaled.jpeg"), "pouding-chomeur");
        assert_eq!(normalize_stem("cretons-e1589912345-300x200.png"), "cretons");
        assert_eq!(normalize_stem("soupe-aux-pois.webp"), "soupe-aux-pois");
        // Not a WordPress suffix
        assert_eq!(normalize_stem("pate-chinoise-express.webp"), "pate-chinoise-express");
        assert_eq!(normalize_stem("tarte-e.webp"), "tarte-e");
        assert_eq!(normalize_stem("galette-1024x.webp"), "galette-1024x");
    }

    #[test]
    fn test_strip_wordpress_suffix_keeps_a_base() {
        assert_eq!(strip_wordpress_suffix("-scaled"), "-scaled");
        assert_eq!(strip_wordpress_suffix("-300x200"), "-300x200");
        assert_eq!(strip_wordpress_suffix("a-300x200"), "a");
        assert_eq!(strip_wordpress_suffix("cretons-e15-300x200"), "cretons-e15");
        assert_eq!(strip_wordpress_suffix("sucre-à-la-crème-scaled"), "sucre-à-la-crème");
    }

    #[test]
    fn test_exact_stem_wins() {
        let bucket = files(&["tourtiere-du-lac.webp", "tourtiere.webp"]);
        assert_eq!(
            match_bucket_file(
                Some("https://old.example.com/uploads/tourtiere-768x512.jpg"),
                "tourtiere-du-lac",
                &bucket
            ),
            Some("tourtiere.webp")
        );
    }

    #[test]
    fn test_falls_back_to_slug_prefix() {
        let bucket = files(&["galettes-mais-2.webp", "galettes-mais.webp", "autre.webp"]);
        assert_eq!(
            match_bucket_file(Some("https://old.example.com/x/IMG_1234.jpg"), "galettes-mais", &bucket),
            Some("galettes-mais-2.webp")
        );
        assert_eq!(match_bucket_file(None, "galettes-mais", &bucket), Some("galettes-mais-2.webp"));
    }

    #[test]
    fn test_no_match() {
        let bucket = files(&["autre.webp"]);
        assert_eq!(match_bucket_file(None, "tarte", &bucket), None);
        assert_eq!(match_bucket_file(None, "", &bucket), None);
    }
}
