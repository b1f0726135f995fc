//! User and session entities
//!
//! Identity is owned by the auth provider. A `Session` is the explicit
//! context handed to every backend operation made on a user's behalf.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A session this close to its expiry is renewed before use
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Unique identifier for a user (auth user id, also the profile id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
}

/// An authenticated backend session
#[derive(Clone)]
pub struct Session {
    pub user: User,
    /// Bearer token for the backend; never logged
    pub access_token: String,
    /// Exchanged for a new access token once this one expires; never logged
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted, if the provider said
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// The access token is expired, or will be within the renewal margin
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|at| at <= now + Duration::seconds(EXPIRY_MARGIN_SECS))
            .unwrap_or(false)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Email/password pair used to sign in
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Data needed to register a new account
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Result of a sign-up: the session is absent while email confirmation is pending
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: User,
    pub session: Option<Session>,
}
