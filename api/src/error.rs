//! Unified error types for the Story-Tell API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core feed/draft rule violations
//! - `BackendError`: Supabase (REST, auth, functions) client errors
//! - `AppError`: Application layer errors (wraps both for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The entity is in a state that does not allow the operation
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    /// The bare message, without the category prefix
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg) | DomainError::Conflict(msg) => msg,
        }
    }
}

/// Backend collaborator (Supabase) errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Unique constraint violation (PostgREST code 23505 or HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited")]
    RateLimited,

    /// A callable function answered but reported failure
    #[error("Function error: {0}")]
    Function(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl BackendError {
    /// The backend-supplied message, suitable for showing to the user verbatim
    pub fn message(&self) -> String {
        match self {
            BackendError::Request(e) => e.to_string(),
            BackendError::Api { message, .. } => message.clone(),
            BackendError::Conflict(msg)
            | BackendError::Unauthorized(msg)
            | BackendError::Function(msg)
            | BackendError::Deserialization(msg) => msg.clone(),
            BackendError::RateLimited => "Too many requests, please try again later".to_string(),
        }
    }
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl AppError {
    /// Message to surface to the user, with backend messages passed through as-is
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(e) => e.message().to_string(),
            AppError::Backend(e) => e.message(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Unauthorized => "Unauthorized".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(DomainError::Validation(_)) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Backend(e) => match e {
                BackendError::Conflict(_) => StatusCode::CONFLICT,
                BackendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                BackendError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                // Auth rejections (bad credentials, already registered) come back as 4xx
                BackendError::Api { status, .. } if (400..500).contains(status) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, details) = match &self {
            AppError::Domain(DomainError::Validation(msg)) => {
                ("Validation error", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Conflict(msg)) => ("Conflict", Some(msg.clone())),
            AppError::Backend(e) => {
                tracing::error!("Backend error: {}", e);
                ("Backend error", Some(e.message()))
            }
            AppError::BadRequest(msg) => ("Bad request", Some(msg.clone())),
            AppError::Unauthorized => ("Unauthorized", None),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
