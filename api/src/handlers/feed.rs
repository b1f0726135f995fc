//! Feed handlers
//!
//! The post list and likes.
//! Supports content negotiation: Accept: application/json for JSON, otherwise markdown.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::app::SessionState;
use crate::domain::entities::{Draft, LikeOutcome, Post, PostId};
use crate::error::AppError;
use crate::feed::render_feed;
use crate::AppState;

/// Check if the client wants JSON response
pub(crate) fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// JSON view of the feed page
#[derive(Serialize)]
pub struct FeedView {
    pub posts: Vec<Post>,
    pub draft: Draft,
}

impl FeedView {
    pub fn of(session: &SessionState) -> Self {
        Self {
            posts: session
                .feed
                .posts()
                .into_iter()
                .filter(Post::is_displayable)
                .collect(),
            draft: session.feed.draft(),
        }
    }
}

/// GET /feed
///
/// Re-fetches the most recent posts and returns the feed page.
/// A failed fetch is logged and the previous list is shown, unless the backend
/// session could not be renewed, which is a 401.
/// - Accept: application/json → JSON response
/// - Otherwise → Markdown
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<SessionState>>,
    headers: HeaderMap,
) -> Response {
    let context = state.session_service.context(&session);
    session.feed.refresh(&state.feed_service, &context).await;
    if session.is_revoked() {
        return AppError::Unauthorized.into_response();
    }

    if wants_json(&headers) {
        Json(FeedView::of(&session)).into_response()
    } else {
        (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            render_feed(&session.feed.posts(), &session.feed.draft()),
        )
            .into_response()
    }
}

#[derive(Serialize)]
pub struct LikeResponse {
    /// `None` when the like failed; the failure is not reported further
    pub outcome: Option<LikeOutcome>,
    pub posts: Vec<Post>,
}

/// POST /posts/:id/like
///
/// Liking a post twice is not an error. Other failures are logged and the
/// response simply carries the unchanged post list.
pub async fn like_post(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<SessionState>>,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id: PostId = post_id.parse().map_err(AppError::BadRequest)?;

    let context = state.session_service.context(&session);
    let outcome = session
        .feed
        .like(&state.feed_service, &context, post_id)
        .await;
    if session.is_revoked() {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(LikeResponse {
        outcome,
        posts: FeedView::of(&session).posts,
    }))
}
