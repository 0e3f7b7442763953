//! Core types for Menucochon.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod locale;
pub mod money;
pub mod rating;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use locale::{Locale, LocaleError};
pub use money::{Currency, CurrencyError, Price};
pub use rating::{Rating, RatingError, RatingSummary};
pub use slug::{fold_accents, slugify};
pub use status::*;
