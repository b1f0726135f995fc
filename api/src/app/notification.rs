//! User-facing notifications
//!
//! The outcome of an action as the user should see it: a title, a one-line
//! description and whether it reports a failure.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

/// A failed action: what to show, and the error behind it
#[derive(Debug)]
pub struct ActionError {
    pub notification: Notification,
    pub error: AppError,
}

impl ActionError {
    /// Notification titled `title` whose description is the error's user message
    pub fn new(title: &str, error: AppError) -> Self {
        Self {
            notification: Notification::failure(title, error.user_message()),
            error,
        }
    }

    /// Same as `new`, but with a fixed description instead of the error's message
    pub fn with_description(title: &str, description: &str, error: AppError) -> Self {
        Self {
            notification: Notification::failure(title, description),
            error,
        }
    }
}

#[derive(Serialize)]
struct ActionErrorResponse<'a> {
    error: String,
    details: String,
    notification: &'a Notification,
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.error, "Action failed");
        }
        let body = Json(ActionErrorResponse {
            error: self.notification.title.clone(),
            details: self.error.user_message(),
            notification: &self.notification,
        });
        (status, body).into_response()
    }
}
