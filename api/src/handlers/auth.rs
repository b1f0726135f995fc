//! Auth handlers
//!
//! Sign-up, sign-in and sign-out. Successful sign-up/sign-in return the
//! session token to send as `Authorization: Bearer <token>`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{ActionError, Notification, SessionState};
use crate::domain::entities::{Credentials, SignUp, User};
use crate::AppState;

#[derive(Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    /// Missing after sign-up while email confirmation is pending
    pub session_token: Option<String>,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

/// POST /auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, ActionError> {
    tracing::info!(username = %body.username, "Sign up attempt");

    let signed_up = state
        .session_service
        .sign_up(SignUp {
            email: body.email,
            password: body.password,
            username: body.username,
        })
        .await?;

    let response = AuthResponse {
        session_token: signed_up.signed_in.map(|s| s.token),
        user: signed_up.user,
        notification: Some(signed_up.notification),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// POST /auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<AuthResponse>, ActionError> {
    let signed_in = state
        .session_service
        .sign_in(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(AuthResponse {
        session_token: Some(signed_in.token),
        user: signed_in.state.user(),
        notification: None,
    }))
}

/// POST /auth/signout
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<SessionState>>,
) -> StatusCode {
    state.session_service.sign_out(&session).await;
    StatusCode::NO_CONTENT
}
