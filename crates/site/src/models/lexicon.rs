//! Culinary lexicon entries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use menucochon_core::{LexiconTermId, Locale, fold_accents};

/// A glossary term with its definition.
#[derive(Debug, Clone, FromRow)]
pub struct LexiconTerm {
    pub id: LexiconTermId,
    pub slug: String,
    pub term_fr: String,
    pub term_en: Option<String>,
    pub definition_fr: String,
    pub definition_en: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl LexiconTerm {
    /// Term in the requested locale.
    #[must_use]
    pub fn term(&self, locale: Locale) -> &str {
        locale.pick(&self.term_fr, self.term_en.as_deref())
    }

    /// Definition in the requested locale.
    #[must_use]
    pub fn definition(&self, locale: Locale) -> &str {
        locale.pick(&self.definition_fr, self.definition_en.as_deref())
    }

    /// Index letter of the displayed term (`É` files under `E`, digits under `#`).
    #[must_use]
    pub fn letter(&self, locale: Locale) -> char {
        index_letter(self.term(locale))
    }
}

/// Uppercase, accent-free first letter used to group terms.
#[must_use]
pub fn index_letter(term: &str) -> char {
    fold_accents(term.trim())
        .chars()
        .next()
        .map_or('#', |c| {
            if c.is_ascii_alphabetic() {
                c.to_ascii_uppercase()
            } else {
                '#'
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_letter() {
        assert_eq!(index_letter("émincer"), 'E');
        assert_eq!(index_letter("  blanchir"), 'B');
        assert_eq!(index_letter("4 épices"), '#');
        assert_eq!(index_letter(""), '#');
    }
}
