//! Draft handlers
//!
//! Composing a post: text, generated images, submission.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{ActionError, Notification, SessionState};
use crate::domain::entities::{Draft, Post};
use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Response for draft actions
#[derive(Serialize)]
pub struct DraftResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    pub draft: Draft,
}

#[derive(Serialize)]
pub struct RemoveImageResponse {
    pub removed: String,
    pub draft: Draft,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    /// Absent when there was nothing to post
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    pub draft: Draft,
    pub posts: Vec<Post>,
}

/// GET /draft
pub async fn get_draft(Extension(session): Extension<Arc<SessionState>>) -> Json<Draft> {
    Json(session.feed.draft())
}

/// PUT /draft/content
pub async fn set_content(
    Extension(session): Extension<Arc<SessionState>>,
    Json(body): Json<ContentRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    session.feed.set_content(&body.content)?;

    Ok(Json(DraftResponse {
        notification: None,
        draft: session.feed.draft(),
    }))
}

/// POST /draft/images
///
/// Generates an image from the prompt and appends it to the draft.
pub async fn generate_image(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<SessionState>>,
    Json(body): Json<PromptRequest>,
) -> Result<Json<DraftResponse>, ActionError> {
    let context = state.session_service.context(&session);
    let notification = session
        .feed
        .generate_image(&state.feed_service, &context, &body.prompt)
        .await?;

    Ok(Json(DraftResponse {
        notification: Some(notification),
        draft: session.feed.draft(),
    }))
}

/// DELETE /draft/images/:index
pub async fn remove_image(
    Extension(session): Extension<Arc<SessionState>>,
    Path(index): Path<usize>,
) -> Result<Json<RemoveImageResponse>, AppError> {
    let removed = session.feed.remove_image(index)?;

    Ok(Json(RemoveImageResponse {
        removed,
        draft: session.feed.draft(),
    }))
}

/// POST /draft/submit
///
/// Shares the draft as a post. An empty draft is a no-op.
pub async fn submit_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<SessionState>>,
) -> Result<Json<SubmitResponse>, ActionError> {
    let context = state.session_service.context(&session);
    let notification = session
        .feed
        .submit_draft(&state.feed_service, &context)
        .await?;

    Ok(Json(SubmitResponse {
        notification,
        draft: session.feed.draft(),
        posts: super::feed::FeedView::of(&session).posts,
    }))
}
