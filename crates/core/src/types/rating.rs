//! Recipe star ratings.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside the 1-5 star range.
    #[error("rating must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// Rejected value.
        value: i64,
        /// Lowest accepted value.
        min: u8,
        /// Highest accepted value.
        max: u8,
    },
}

/// A single star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Build a rating from untrusted input.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` unless `1 <= value <= 5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// The number of stars.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Aggregate of all ratings for one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal, 0 when there are no ratings.
    pub average: f64,
    /// Number of ratings.
    pub count: i64,
}

impl RatingSummary {
    /// Build a summary from the raw sum and count of ratings.
    #[must_use]
    pub fn from_totals(sum: i64, count: i64) -> Self {
        if count <= 0 {
            return Self::default();
        }

        #[allow(clippy::cast_precision_loss)] // rating totals stay far below 2^52
        let average = sum as f64 / count as f64;

        Self {
            average: (average * 10.0).round() / 10.0,
            count,
        }
    }

    /// Number of full stars to draw.
    #[must_use]
    pub fn full_stars(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stars = self.average.round().clamp(0.0, 5.0) as u8;
        stars
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert!(Rating::new(i64::from(u8::MAX) + 1).is_err());
    }

    #[test]
    fn test_rating_deserialize_validates() {
        let ok: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_summary_rounding() {
        let summary = RatingSummary::from_totals(14, 3);
        assert!((summary.average - 4.7).abs() < f64::EPSILON);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.full_stars(), 5);
    }

    #[test]
    fn test_summary_empty() {
        let summary = RatingSummary::from_totals(0, 0);
        assert!(summary.average.abs() < f64::EPSILON);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.full_stars(), 0);
    }
}
