//! Shop products.

use serde::Serialize;
use sqlx::FromRow;

use menucochon_core::{Currency, Locale, Price, ProductId};

/// A product sold in the shop (cookbooks, aprons, spice blends...).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub description_fr: Option<String>,
    pub description_en: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub active: bool,
}

impl Product {
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_fr, self.name_en.as_deref())
    }

    #[must_use]
    pub fn description(&self, locale: Locale) -> Option<String> {
        locale.pick_opt(self.description_fr.as_deref(), self.description_en.as_deref())
    }

    #[must_use]
    pub const fn price(&self, currency: Currency) -> Price {
        Price::new(self.price_cents, currency)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.active && self.stock > 0
    }
}
