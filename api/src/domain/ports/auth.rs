//! Auth provider port trait
//!
//! Defines the interface for the hosted auth service: account creation,
//! password sign-in, token refresh and revocation.

use async_trait::async_trait;

use crate::domain::entities::{Credentials, Session, SignUp, SignUpOutcome};
use crate::error::BackendError;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account; the username travels in the user metadata
    async fn sign_up(&self, request: &SignUp) -> Result<SignUpOutcome, BackendError>;

    /// Exchange email and password for a session
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, BackendError>;

    /// Exchange a refresh token for a new session.
    ///
    /// Refresh tokens are single use; the returned session carries the next one.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError>;

    /// Revoke the session on the provider
    async fn sign_out(&self, session: &Session) -> Result<(), BackendError>;
}
