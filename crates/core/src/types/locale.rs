//! Site locale (French first, English second).
//!
//! French is the canonical language of all content. English is a translation
//! layer: every English field is optional and falls back to French.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Locale`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// The language tag is not one the site serves.
    #[error("unsupported locale: {0}")]
    Unsupported(String),
}

/// A language the site is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "site_locale", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    /// Every supported locale, default first.
    pub const ALL: [Self; 2] = [Self::Fr, Self::En];

    /// Parse a language tag such as `fr`, `fr-CA`, `EN` or `en_US`.
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::Unsupported` for any other language.
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "fr" => Ok(Self::Fr),
            "en" => Ok(Self::En),
            _ => Err(LocaleError::Unsupported(tag.to_string())),
        }
    }

    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }

    /// Prefix prepended to every route in this locale.
    #[must_use]
    pub const fn path_prefix(self) -> &'static str {
        match self {
            Self::Fr => "",
            Self::En => "/en",
        }
    }

    /// The locale offered by the language switcher.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Fr => Self::En,
            Self::En => Self::Fr,
        }
    }

    /// Choose the text to display for this locale.
    ///
    /// English falls back to French when the translation is missing or blank.
    #[must_use]
    pub fn pick<'a>(self, fr: &'a str, en: Option<&'a str>) -> &'a str {
        match (self, en) {
            (Self::En, Some(en)) if !en.trim().is_empty() => en,
            _ => fr,
        }
    }

    /// Owned variant of [`Locale::pick`] for optional French text.
    #[must_use]
    pub fn pick_opt(self, fr: Option<&str>, en: Option<&str>) -> Option<String> {
        match (self, en) {
            (Self::En, Some(en)) if !en.trim().is_empty() => Some(en.to_string()),
            _ => fr.map(str::to_string),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
