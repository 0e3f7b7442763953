//! Domain models for the site.
//!
//! Row types derive `sqlx::FromRow` and carry both the French and the
//! optional English text; views pick the language with [`Locale::pick`].
//!
//! [`Locale::pick`]: menucochon_core::Locale::pick

pub mod admin;
pub mod analytics;
pub mod category;
pub mod lexicon;
pub mod order;
pub mod post;
pub mod product;
pub mod recipe;
pub mod session;
pub mod video;

pub use admin::AdminUser;
pub use analytics::{AffiliateCount, DailyViews, PageCount};
pub use category::Category;
pub use lexicon::LexiconTerm;
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, RevenueSummary};
pub use post::{NewPost, Post};
pub use product::Product;
pub use recipe::{
    Ingredient, Recipe, RecipeFilter, RecipeIngredients, RecipePage, RecipeSummary, Step,
};
pub use session::{CurrentAdmin, keys as session_keys};
pub use video::Video;
