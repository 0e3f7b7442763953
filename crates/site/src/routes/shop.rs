//! Shop pages. The cart lives in the browser; checkout goes through
//! `POST /api/checkout`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::content::render_markdown;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::i18n;
use crate::models::Product;
use crate::routes::{Link, PageContext, not_found};
use crate::services::checkout::MAX_QUANTITY;
use crate::state::AppState;

/// Product tile and detail data.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: i32,
    pub name: String,
    pub href: String,
    pub image_url: Option<String>,
    pub price: String,
    pub in_stock: bool,
    /// Highest quantity the buyer can pick.
    pub max_quantity: i32,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, ctx: &PageContext) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name(ctx.locale).to_string(),
            href: i18n::product_path(ctx.locale, &product.slug),
            image_url: product.image_url.clone(),
            price: ctx.price(product.price_cents),
            in_stock: product.in_stock(),
            max_quantity: product.stock.clamp(0, MAX_QUANTITY),
        }
    }
}

/// `?checkout=cancelled` after an abandoned Stripe session.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub checkout: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductCard>,
    pub cancelled: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductCard,
    pub description_html: Option<String>,
    pub breadcrumbs: Vec<Link>,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/success.html")]
pub struct CheckoutSuccessTemplate {
    pub ctx: PageContext,
}

/// Display the shop.
///
/// # Errors
///
/// Returns an error if the products cannot be loaded.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool())
        .list_active()
        .await?
        .iter()
        .map(|p| ProductCard::new(p, &ctx))
        .collect();

    Ok(ShopIndexTemplate {
        ctx,
        products,
        cancelled: query.checkout.as_deref() == Some("cancelled"),
    })
}

/// Display a product.
///
/// # Errors
///
/// Returns an error if the query fails. Unknown or inactive products get the
/// 404 page.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
    else {
        return Ok(not_found(ctx));
    };

    let breadcrumbs = vec![
        Link {
            label: ctx.t("nav.home").to_string(),
            href: i18n::home_path(ctx.locale),
        },
        Link {
            label: ctx.t("nav.shop").to_string(),
            href: i18n::shop_path(ctx.locale),
        },
    ];

    Ok(ProductShowTemplate {
        product: ProductCard::new(&product, &ctx),
        description_html: product
            .description(ctx.locale)
            .map(|d| render_markdown(&d)),
        breadcrumbs,
        ctx,
    }
    .into_response())
}

/// Thank-you page Stripe redirects to after payment.
///
/// The order itself is created by the webhook, which may land later.
#[instrument(skip(ctx), fields(locale = %ctx.locale))]
pub async fn success(ctx: PageContext) -> impl IntoResponse {
    CheckoutSuccessTemplate { ctx }
}
