//! Video gallery.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::VideoRepository;
use crate::error::Result;
use crate::filters;
use crate::routes::PageContext;
use crate::state::AppState;

/// Videos shown on the gallery page.
const VIDEO_LIMIT: i64 = 48;

/// Video tile.
#[derive(Debug, Clone)]
pub struct VideoCard {
    pub title: String,
    pub embed_url: String,
    pub thumbnail_url: String,
    pub date: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "videos/index.html")]
pub struct VideosTemplate {
    pub ctx: PageContext,
    pub videos: Vec<VideoCard>,
}

/// Display the video gallery, newest first.
///
/// # Errors
///
/// Returns an error if the videos cannot be loaded.
#[instrument(skip(state, ctx), fields(locale = %ctx.locale))]
pub async fn index(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let videos = VideoRepository::new(state.pool())
        .list_published(VIDEO_LIMIT)
        .await?
        .iter()
        .map(|v| VideoCard {
            title: v.title(ctx.locale).to_string(),
            embed_url: v.embed_url(),
            thumbnail_url: v.thumbnail_url(),
            date: ctx.date(v.published_at.date_naive()),
        })
        .collect();

    Ok(VideosTemplate { ctx, videos })
}
