//! Prices in the smallest currency unit, formatted per locale.
//!
//! Stripe and the database both work in cents, so the canonical amount is an
//! `i64` of cents. Decimal conversion happens only at display time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Locale;

/// Errors that can occur when parsing a [`Currency`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("unsupported currency: {0}")]
    Unsupported(String),
}

/// ISO 4217 currencies the shop can sell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Cad,
    Usd,
    Eur,
}

impl Currency {
    /// Parse a currency code in any case (`cad`, `USD`).
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::Unsupported` for unknown codes.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "cad" => Ok(Self::Cad),
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            _ => Err(CurrencyError::Unsupported(code.to_string())),
        }
    }

    /// Lowercase code as Stripe expects it.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cad => "cad",
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }

    /// Currency symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Cad | Self::Usd => "$",
            Self::Eur => "€",
        }
    }
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in cents.
    pub cents: i64,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(cents: i64, currency: Currency) -> Self {
        Self { cents, currency }
    }

    /// Amount as a two-decimal number.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Multiply by a quantity, saturating on overflow.
    #[must_use]
    pub const fn times(self, quantity: i64) -> Self {
        Self {
            cents: self.cents.saturating_mul(quantity),
            currency: self.currency,
        }
    }

    /// Format for display.
    ///
    /// French puts the symbol after the amount with a comma separator
    /// (`12,99 $`); English puts it first (`$12.99`).
    #[must_use]
    pub fn format(self, locale: Locale) -> String {
        let amount = format!("{:.2}", self.to_decimal());
        let symbol = self.currency.symbol();
        match locale {
            Locale::Fr => format!("{} {symbol}", amount.replace('.', ",")),
            Locale::En => format!("{symbol}{amount}"),
        }
    }
}
