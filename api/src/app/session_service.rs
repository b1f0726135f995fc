//! Session service
//!
//! Sign-up, sign-in and sign-out against the auth provider, plus the registry
//! of local sessions. A local session token maps to the backend session and
//! that session's feed view-model. Tokens are only kept as SHA-256 hashes.
//!
//! Backend sessions are refreshed when their access token expires or is
//! rejected. Local sessions are dropped when they go idle, when the provider
//! refuses to refresh them, or when a user holds too many.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::app::feed_view_model::FeedViewModel;
use crate::app::notification::{ActionError, Notification};
use crate::app::session_context::SessionContext;
use crate::domain::entities::{Credentials, Session, SignUp, User, UserId};
use crate::domain::ports::AuthProvider;
use crate::error::{AppError, BackendError, DomainError};

/// Minimum password length accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Limits on the local session registry
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Sessions unused for longer than this are dropped
    pub idle_timeout: Duration,
    /// Signing in beyond this drops the user's least recently used session
    pub max_per_user: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::days(7),
            max_per_user: 5,
        }
    }
}

/// Everything the server keeps for one signed-in user
pub struct SessionState {
    key: String,
    /// Registration order, breaks `last_seen` ties
    seq: u64,
    user_id: UserId,
    session: RwLock<Session>,
    /// Unix seconds of the last authorized request
    last_seen: AtomicI64,
    revoked: AtomicBool,
    renewing: tokio::sync::Mutex<()>,
    pub feed: FeedViewModel,
}

impl SessionState {
    fn new(key: String, seq: u64, session: Session, now: DateTime<Utc>) -> Self {
        Self {
            key,
            seq,
            user_id: session.user_id(),
            session: RwLock::new(session),
            last_seen: AtomicI64::new(now.timestamp()),
            revoked: AtomicBool::new(false),
            renewing: tokio::sync::Mutex::new(()),
            feed: FeedViewModel::new(),
        }
    }

    /// The current backend session
    pub fn session(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> User {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Signed out, evicted, or refused a refresh; requests must not use it
    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }

    fn replace_session(&self, session: Session) {
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_seen.fetch_max(now.timestamp(), Ordering::SeqCst);
    }

    fn last_seen(&self) -> i64 {
        self.last_seen.load(Ordering::SeqCst)
    }

    /// Idle too long, or expired with no way to refresh
    fn is_stale(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        if now.timestamp() - self.last_seen() > idle_timeout.num_seconds() {
            return true;
        }
        let session = self.session();
        session.is_expired(now) && !session.can_refresh()
    }
}

/// A freshly issued local session
pub struct SignedIn {
    /// Returned to the client once; only its hash is stored
    pub token: String,
    pub state: Arc<SessionState>,
}

pub struct SignedUp {
    pub user: User,
    /// Absent while the provider waits for email confirmation
    pub signed_in: Option<SignedIn>,
    pub notification: Notification,
}

/// Service for authentication and local sessions
pub struct SessionService<AP>
where
    AP: AuthProvider + ?Sized,
{
    auth: Arc<AP>,
    policy: SessionPolicy,
    sessions: RwLock<HashMap<String, Arc<SessionState>>>,
    next_seq: AtomicU64,
}

impl<AP> SessionService<AP>
where
    AP: AuthProvider + ?Sized,
{
    pub fn new(auth: Arc<AP>) -> Self {
        Self {
            auth,
            policy: SessionPolicy::default(),
            sessions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register a new account and sign it in when the provider allows it
    pub async fn sign_up(&self, request: SignUp) -> Result<SignedUp, ActionError> {
        if request.username.trim().is_empty() {
            return Err(validation("Username required", "Please enter a username"));
        }
        if request.email.trim().is_empty() || request.password.trim().is_empty() {
            return Err(validation("Missing information", "Please fill in all fields"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(validation(
                "Password too short",
                &format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LEN
                ),
            ));
        }

        let outcome = self.auth.sign_up(&request).await.map_err(|e| {
            tracing::error!(error = %e, "Sign up error");
            provider_failure("Error signing up", "Something went wrong", e.into())
        })?;

        tracing::info!(user_id = %outcome.user.id, "Sign up successful");

        let signed_in = outcome.session.map(|session| self.register(session));
        Ok(SignedUp {
            user: outcome.user,
            signed_in,
            notification: Notification::success(
                "Welcome to Story-Tell!",
                "Your account has been created successfully",
            ),
        })
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<SignedIn, ActionError> {
        if credentials.email.trim().is_empty() || credentials.password.trim().is_empty() {
            return Err(validation(
                "Missing information",
                "Please enter both email and password",
            ));
        }

        let session = self.auth.sign_in(&credentials).await.map_err(|e| {
            tracing::error!(error = %e, "Sign in error");
            provider_failure("Error signing in", "Invalid credentials", e.into())
        })?;

        tracing::info!(user_id = %session.user_id(), "Sign in successful");
        Ok(self.register(session))
    }

    /// Drop the local session and revoke it on the provider (best effort)
    pub async fn sign_out(&self, state: &SessionState) {
        self.evict(state);

        if let Err(e) = self.auth.sign_out(&state.session()).await {
            tracing::warn!(error = %e, user_id = %state.user_id, "Failed to revoke session");
        }
    }

    /// Resolve a client token to a usable session.
    ///
    /// An expired backend session is refreshed first. `None` means the client
    /// has to sign in again.
    pub async fn authorize(&self, token: &str) -> Option<Arc<SessionState>> {
        self.authorize_at(token, Utc::now()).await
    }

    pub(crate) async fn authorize_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Option<Arc<SessionState>> {
        let state = self.lookup(token)?;

        if state.is_stale(now, self.policy.idle_timeout) {
            tracing::info!(user_id = %state.user_id, "Dropping stale session");
            self.evict(&state);
            return None;
        }

        let current = state.session();
        if current.is_expired(now) && !self.renew(&state, &current).await {
            return None;
        }

        state.touch(now);
        Some(state)
    }

    /// Refresh the backend session after `rejected` stopped working.
    ///
    /// Concurrent callers holding the same rejected session share one refresh.
    /// A refusal from the provider evicts the local session; a transient
    /// failure leaves it in place.
    pub async fn renew(&self, state: &SessionState, rejected: &Session) -> bool {
        let _renewing = state.renewing.lock().await;
        if state.is_revoked() {
            return false;
        }

        let current = state.session();
        if current.access_token != rejected.access_token {
            return true;
        }

        let Some(refresh_token) = current.refresh_token.as_deref() else {
            tracing::info!(user_id = %state.user_id, "Session expired and cannot be refreshed");
            self.evict(state);
            return false;
        };

        match self.auth.refresh(refresh_token).await {
            Ok(fresh) => {
                tracing::debug!(user_id = %state.user_id, "Session refreshed");
                state.replace_session(fresh);
                true
            }
            Err(e) if is_refusal(&e) => {
                tracing::info!(error = %e, user_id = %state.user_id, "Session refresh refused");
                self.evict(state);
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %state.user_id, "Session refresh failed");
                false
            }
        }
    }

    /// Bind a session to this service for the duration of a request
    pub fn context<'a>(&'a self, state: &'a SessionState) -> ActiveSession<'a, AP> {
        ActiveSession {
            service: self,
            state,
        }
    }

    #[cfg(test)]
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lookup(&self, token: &str) -> Option<Arc<SessionState>> {
        let key = hash_session_token(token);
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn register(&self, session: Session) -> SignedIn {
        let now = Utc::now();
        let token = generate_session_token();
        let key = hash_session_token(&token);
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let state = Arc::new(SessionState::new(key.clone(), seq, session, now));

        let mut sessions = self.write_sessions();
        self.prune(&mut sessions, now);

        let limit = self.policy.max_per_user.max(1);
        let mut own: Vec<Arc<SessionState>> = sessions
            .values()
            .filter(|s| s.user_id == state.user_id)
            .cloned()
            .collect();
        if own.len() >= limit {
            own.sort_by_key(|s| (s.last_seen(), s.seq));
            for oldest in &own[..own.len() + 1 - limit] {
                sessions.remove(&oldest.key);
                oldest.revoke();
            }
            tracing::debug!(user_id = %state.user_id, limit, "Dropped least recently used sessions");
        }

        sessions.insert(key, state.clone());
        SignedIn { token, state }
    }

    fn prune(&self, sessions: &mut HashMap<String, Arc<SessionState>>, now: DateTime<Utc>) {
        sessions.retain(|_, s| {
            let stale = s.is_stale(now, self.policy.idle_timeout);
            if stale {
                s.revoke();
            }
            !stale
        });
    }

    fn evict(&self, state: &SessionState) {
        self.write_sessions().remove(&state.key);
        state.revoke();
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<SessionState>>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A local session bound to the service that can renew it
pub struct ActiveSession<'a, AP>
where
    AP: AuthProvider + ?Sized,
{
    service: &'a SessionService<AP>,
    state: &'a SessionState,
}

#[async_trait]
impl<'a, AP> SessionContext for ActiveSession<'a, AP>
where
    AP: AuthProvider + ?Sized,
{
    fn current(&self) -> Session {
        self.state.session()
    }

    async fn renew(&self, rejected: &Session) -> bool {
        self.service.renew(self.state, rejected).await
    }
}

/// The provider answered and said no, as opposed to being unreachable
fn is_refusal(error: &BackendError) -> bool {
    match error {
        BackendError::Unauthorized(_) => true,
        BackendError::Api { status, .. } => (400..500).contains(status),
        _ => false,
    }
}

fn validation(title: &str, description: &str) -> ActionError {
    ActionError::new(title, DomainError::Validation(description.to_string()).into())
}

/// Provider errors are shown verbatim, with a fallback for empty messages
fn provider_failure(title: &str, fallback: &str, error: AppError) -> ActionError {
    let message = error.user_message();
    if message.trim().is_empty() {
        ActionError::with_description(title, fallback, error)
    } else {
        ActionError::new(title, error)
    }
}

/// Generate a local session token
fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("st-{}", hex::encode(bytes))
}

/// Hash a session token for storage
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
