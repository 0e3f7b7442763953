//! Ingredient matching: "what can I cook with what I have?"
//!
//! A linear scan over the ingredient lists of published recipes. The lists
//! are loaded once and cached for five minutes by `AppState::search_index`;
//! each request normalizes its query and compares it against them in memory.
//! There is no inverted index.

use std::cmp::Ordering;

use serde::Serialize;

use menucochon_core::{Locale, RecipeId, fold_accents};

use crate::models::RecipeIngredients;

/// Maximum number of terms taken from a query.
pub const MAX_TERMS: usize = 10;

/// Errors from parsing an ingredient query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no ingredient given")]
    EmptyQuery,
}

/// One recipe that uses at least one of the searched ingredients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientMatch {
    pub id: RecipeId,
    pub slug: String,
    pub title: String,
    pub image_url: Option<String>,
    /// Query terms found in the recipe, in query order.
    pub matched: Vec<String>,
    /// Query terms the recipe does not use, in query order.
    pub missing: Vec<String>,
}

/// Normalize an ingredient name for comparison.
///
/// Lowercases, folds accents, collapses whitespace and drops a trailing
/// plural `s` or `x` from words longer than three letters.
///
/// ```
/// use menucochon_site::search::normalize_ingredient;
///
/// assert_eq!(normalize_ingredient("  Tomates  Cerises "), "tomate cerise");
/// assert_eq!(normalize_ingredient("Poireaux"), "poireau");
/// assert_eq!(normalize_ingredient("Riz"), "riz");
/// ```
#[must_use]
pub fn normalize_ingredient(name: &str) -> String {
    let folded = fold_accents(name).to_lowercase();
    folded
        .split_whitespace()
        .map(singular)
        .collect::<Vec<_>>()
        .join(" ")
}

fn singular(word: &str) -> &str {
    if word.chars().count() > 3
        && let Some(stripped) = word.strip_suffix(['s', 'x'])
    {
        return stripped;
    }
    word
}

/// Split a free-form query (`"tomates, Oignon ;ail"`) into normalized terms.
///
/// Terms are separated by commas, semicolons or newlines, deduplicated in
/// order of first appearance and capped at [`MAX_TERMS`].
///
/// # Errors
///
/// Returns `SearchError::EmptyQuery` if no term remains.
pub fn parse_query(query: &str) -> Result<Vec<String>, SearchError> {
    let mut terms: Vec<String> = Vec::new();
    for raw in query.split([',', ';', '\n']) {
        let term = normalize_ingredient(raw);
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
        if terms.len() == MAX_TERMS {
            break;
        }
    }

    if terms.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(terms)
}

/// Rank recipes by how many of the query terms they use.
///
/// A recipe uses a term when any of its normalized ingredient names contains
/// it. Recipes using none are dropped. Order: most matched terms, then fewest
/// missing terms, then title.
#[must_use]
pub fn rank_recipes(
    index: &[RecipeIngredients],
    terms: &[String],
    locale: Locale,
    limit: usize,
) -> Vec<IngredientMatch> {
    let mut matches: Vec<IngredientMatch> = index
        .iter()
        .filter_map(|recipe| {
            let names: Vec<String> = recipe
                .ingredients
                .iter()
                .map(|n| normalize_ingredient(n))
                .collect();

            let (matched, missing): (Vec<String>, Vec<String>) = terms
                .iter()
                .cloned()
                .partition(|term| names.iter().any(|name| name.contains(term.as_str())));

            if matched.is_empty() {
                return None;
            }

            Some(IngredientMatch {
                id: recipe.id,
                slug: recipe.slug.clone(),
                title: locale
                    .pick(&recipe.title_fr, recipe.title_en.as_deref())
                    .to_string(),
                image_url: recipe.image_url.clone(),
                matched,
                missing,
            })
        })
        .collect();

    matches.sort_by(compare_matches);
    matches.truncate(limit);
    matches
}

fn compare_matches(a: &IngredientMatch, b: &IngredientMatch) -> Ordering {
    b.matched
        .len()
        .cmp(&a.matched.len())
        .then_with(|| a.missing.len().cmp(&b.missing.len()))
        .then_with(|| fold_accents(&a.title).to_lowercase().cmp(&fold_accents(&b.title).to_lowercase()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recipe(id: i32, title: &str, ingredients: &[&str]) -> RecipeIngredients {
        RecipeIngredients {
            id: RecipeId::new(id),
            slug: menucochon_core::slugify(title),
            title_fr: title.to_string(),
            title_en: None,
            image_url: None,
            ingredients: ingredients.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_normalize_folds_and_singularizes() {
        assert_eq!(normalize_ingredient("Échalotes françaises"), "echalote francaise");
        assert_eq!(normalize_ingredient("Poireaux"), "poireau");
        assert_eq!(normalize_ingredient("ail"), "ail");
        assert_eq!(normalize_ingredient("   "), "");
    }

    #[test]
    fn test_parse_query_dedupes_and_caps() {
        let terms = parse_query("tomates, Oignon ;ail\ntomate").unwrap();
        assert_eq!(terms, vec!["tomate", "oignon", "ail"]);

        let many = (0..20).map(|i| format!("ingredient{i}")).collect::<Vec<_>>().join(",");
        assert_eq!(parse_query(&many).unwrap().len(), MAX_TERMS);
    }

    #[test]
    fn test_parse_query_empty() {
        assert_eq!(parse_query(" , ; "), Err(SearchError::EmptyQuery));
        assert_eq!(parse_query(""), Err(SearchError::EmptyQuery));
    }

    #[test]
    fn test_rank_orders_by_matches_then_missing_then_title() {
        let index = vec![
            recipe(1, "Soupe à l'oignon", &["Oignons jaunes", "Bouillon de boeuf", "Fromage"]),
            recipe(2, "Sauce tomate", &["Tomates italiennes", "Oignon", "Ail"]),
            recipe(3, "Gâteau", &["Farine", "Sucre"]),
            recipe(4, "Bruschetta", &["Tomates", "Ail", "Pain"]),
        ];
        let terms = parse_query("tomates, oignon, ail").unwrap();
        let ranked = rank_recipes(&index, &terms, Locale::Fr, 10);

        let ids: Vec<i32> = ranked.iter().map(|m| m.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 4, 1]);
        assert_eq!(ranked[1].missing, vec!["oignon"]);
        assert_eq!(ranked[2].matched, vec!["oignon"]);
    }

    #[test]
    fn test_rank_matches_substrings_and_limits() {
        let index = vec![
            recipe(1, "B", &["Pommes de terre"]),
            recipe(2, "A", &["Pomme"]),
        ];
        let terms = parse_query("pomme").unwrap();
        let ranked = rank_recipes(&index, &terms, Locale::Fr, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "A");
    }

    #[test]
    fn test_rank_uses_locale_title() {
        let mut r = recipe(1, "Tarte aux pommes", &["Pommes"]);
        r.title_en = Some("Apple pie".to_string());
        let ranked = rank_recipes(&[r], &parse_query("pomme").unwrap(), Locale::En, 5);
        assert_eq!(ranked[0].title, "Apple pie");
    }
}
