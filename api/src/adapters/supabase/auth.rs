//! Supabase auth provider (GoTrue endpoints)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::SupabaseClient;
use crate::domain::entities::{Credentials, Session, SignUp, SignUpOutcome, User, UserId};
use crate::domain::ports::AuthProvider;
use crate::error::BackendError;

pub struct SupabaseAuthProvider {
    client: Arc<SupabaseClient>,
}

impl SupabaseAuthProvider {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    username: &'a str,
}

#[derive(Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrantRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct UserResponse {
    id: uuid::Uuid,
    email: Option<String>,
}

impl From<UserResponse> for User {
    fn from(r: UserResponse) -> Self {
        User {
            id: UserId(r.id),
            email: r.email,
        }
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    access_token: String,
    refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    expires_in: Option<i64>,
    /// Unix timestamp; preferred over `expires_in` when both are present
    expires_at: Option<i64>,
    user: UserResponse,
}

impl SessionResponse {
    fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0),
            (None, Some(secs)) => Some(now + Duration::seconds(secs)),
            (None, None) => None,
        }
    }
}

impl From<SessionResponse> for Session {
    fn from(r: SessionResponse) -> Self {
        let expires_at = r.expiry(Utc::now());
        Session {
            user: r.user.into(),
            access_token: r.access_token,
            refresh_token: r.refresh_token,
            expires_at,
        }
    }
}

/// Sign-up answers with a full session when email confirmation is off,
/// otherwise with the bare user.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(SessionResponse),
    User(UserResponse),
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(r: SignUpResponse) -> Self {
        match r {
            SignUpResponse::Session(s) => {
                let session = Session::from(s);
                SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpResponse::User(u) => SignUpOutcome {
                user: u.into(),
                session: None,
            },
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_up(&self, request: &SignUp) -> Result<SignUpOutcome, BackendError> {
        let response = self
            .client
            .request(Method::POST, &self.client.auth_url("/signup"), None)
            .json(&SignUpRequest {
                email: &request.email,
                password: &request.password,
                data: SignUpMetadata {
                    username: &request.username,
                },
            })
            .send()
            .await?;

        let body: SignUpResponse = self.client.handle_response(response).await?;
        Ok(body.into())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        let response = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("/token?grant_type=password"),
                None,
            )
            .json(&PasswordGrantRequest {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await?;

        let body: SessionResponse = self.client.handle_response(response).await?;
        Ok(body.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let response = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("/token?grant_type=refresh_token"),
                None,
            )
            .json(&RefreshGrantRequest { refresh_token })
            .send()
            .await?;

        let body: SessionResponse = self.client.handle_response(response).await?;
        Ok(body.into())
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        let response = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("/logout"),
                Some(&session.access_token),
            )
            .send()
            .await?;

        self.client.handle_empty_response(response).await
    }
}
