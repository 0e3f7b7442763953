//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::content::{reading_time_minutes, render_markdown};
use crate::db::PostRepository;
use crate::error::Result;
use crate::filters;
use crate::i18n;
use crate::models::Post;
use crate::models::post::POSTS_PER_PAGE;
use crate::routes::{Link, PageContext, not_found};
use crate::state::AppState;

/// Number of recent posts to show under a post.
const RECENT_POSTS_COUNT: i64 = 3;

/// Post teaser for listings.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub title: String,
    pub href: String,
    pub description: Option<String>,
    pub date: String,
    pub cover_url: Option<String>,
    pub reading_time_minutes: u32,
}

impl PostCard {
    #[must_use]
    pub fn new(post: &Post, ctx: &PageContext) -> Self {
        Self {
            title: post.title(ctx.locale).to_string(),
            href: i18n::post_path(ctx.locale, &post.slug),
            description: post.description(ctx.locale),
            date: ctx.date(post.published_at),
            cover_url: post.cover_url.clone(),
            reading_time_minutes: reading_time_minutes(post.body(ctx.locale)),
        }
    }
}

/// Blog index query string.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub ctx: PageContext,
    pub posts: Vec<PostCard>,
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub ctx: PageContext,
    pub post: PostCard,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub content_html: String,
    pub recent_posts: Vec<PostCard>,
    pub breadcrumbs: Vec<Link>,
}

/// Display the blog index page.
///
/// # Errors
///
/// Returns an error if the posts cannot be loaded.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let (posts, total) = PostRepository::new(state.pool()).list_published(page).await?;

    let base = i18n::blog_path(ctx.locale);
    let shown = i64::from(page) * i64::from(POSTS_PER_PAGE);
    let previous = match page {
        1 => None,
        2 => Some(base.clone()),
        p => Some(format!("{base}?page={}", p - 1)),
    };
    let next = (shown < total).then(|| format!("{base}?page={}", page + 1));

    Ok(BlogIndexTemplate {
        posts: posts.iter().map(|p| PostCard::new(p, &ctx)).collect(),
        previous,
        next,
        ctx,
    })
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns an error if a query fails. Drafts and unknown slugs get the 404
/// page.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<Response> {
    let posts = PostRepository::new(state.pool());
    let Some(post) = posts.get_by_slug(&slug).await? else {
        return Ok(not_found(ctx));
    };

    let recent_posts = posts
        .recent(RECENT_POSTS_COUNT, Some(post.id))
        .await?
        .iter()
        .map(|p| PostCard::new(p, &ctx))
        .collect();

    let breadcrumbs = vec![
        Link {
            label: ctx.t("nav.home").to_string(),
            href: i18n::home_path(ctx.locale),
        },
        Link {
            label: ctx.t("nav.blog").to_string(),
            href: i18n::blog_path(ctx.locale),
        },
    ];

    Ok(BlogShowTemplate {
        post: PostCard::new(&post, &ctx),
        author: post.author.clone(),
        tags: post.tags.clone(),
        content_html: render_markdown(post.body(ctx.locale)),
        recent_posts,
        breadcrumbs,
        ctx,
    }
    .into_response())
}
