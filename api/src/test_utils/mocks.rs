//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::app::session_context::SessionContext;
use crate::app::{DynFeedService, FeedService};
use crate::domain::entities::{
    Credentials, NewLike, NewPost, Post, PostId, Session, SignUp, SignUpOutcome, User, UserId,
};
use crate::domain::ports::{AuthProvider, ImageGenerator, LikeRepository, PostRepository};
use crate::error::BackendError;

use super::fixtures::test_profile;

// ============================================================================
// In-Memory Post Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Arc<RwLock<Vec<Post>>>,
    inserts: Arc<RwLock<Vec<NewPost>>>,
    fetch_calls: AtomicUsize,
    fetch_failure: RwLock<Option<String>>,
    create_failure: Option<String>,
    rejected_token: RwLock<Option<String>>,
    ignore_limit: bool,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a post for testing
    pub fn with_post(self, post: Post) -> Self {
        self.posts.write().unwrap().push(post);
        self
    }

    /// Return every stored post, like a backend that ignores `limit`
    pub fn ignoring_limit(mut self) -> Self {
        self.ignore_limit = true;
        self
    }

    /// Make every insert fail with this backend message
    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_failure = Some(message.to_string());
        self
    }

    /// Make subsequent fetches fail (or succeed again with `None`)
    pub fn set_fetch_failure(&self, message: Option<&str>) {
        *self.fetch_failure.write().unwrap() = message.map(str::to_string);
    }

    /// Answer 401 to any request made with this access token, like an expired JWT
    pub fn set_rejected_token(&self, token: Option<&str>) {
        *self.rejected_token.write().unwrap() = token.map(str::to_string);
    }

    fn check_token(&self, session: &Session) -> Result<(), BackendError> {
        if self.rejected_token.read().unwrap().as_deref() == Some(session.access_token.as_str()) {
            return Err(BackendError::Unauthorized("JWT expired".to_string()));
        }
        Ok(())
    }

    /// Every insert request received, in order
    pub fn inserts(&self) -> Vec<NewPost> {
        self.inserts.read().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn increment_likes(&self, post_id: PostId) {
        let mut posts = self.posts.write().unwrap();
        if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
            post.like_count += 1;
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn fetch_recent(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<Post>, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token(session)?;

        if let Some(message) = self.fetch_failure.read().unwrap().clone() {
            return Err(BackendError::Api {
                status: 503,
                code: None,
                message,
            });
        }

        let mut posts = self.posts.read().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if !self.ignore_limit {
            posts.truncate(limit);
        }
        Ok(posts)
    }

    async fn create(&self, session: &Session, post: &NewPost) -> Result<(), BackendError> {
        self.check_token(session)?;
        if let Some(message) = &self.create_failure {
            return Err(BackendError::Api {
                status: 403,
                code: Some("42501".to_string()),
                message: message.clone(),
            });
        }

        self.inserts.write().unwrap().push(post.clone());
        self.posts.write().unwrap().push(Post {
            id: PostId(Uuid::new_v4()),
            author: Some(test_profile()),
            content: Some(post.content.clone()),
            image_urls: post.image_urls.clone(),
            like_count: 0,
            comment_count: 0,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

// ============================================================================
// In-Memory Like Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryLikeRepository {
    likes: Arc<RwLock<Vec<NewLike>>>,
    failure: Option<String>,
    counters: Option<Arc<InMemoryPostRepository>>,
}

impl InMemoryLikeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump `like_count` on the posts stored in `posts`, as the backend trigger does
    pub fn counting_into(posts: Arc<InMemoryPostRepository>) -> Self {
        Self {
            counters: Some(posts),
            ..Self::default()
        }
    }

    /// Make every insert fail with this (non-conflict) backend message
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Every like row stored, in order
    pub fn likes(&self) -> Vec<NewLike> {
        self.likes.read().unwrap().clone()
    }
}

#[async_trait]
impl LikeRepository for InMemoryLikeRepository {
    async fn create(&self, _session: &Session, like: &NewLike) -> Result<(), BackendError> {
        if let Some(message) = &self.failure {
            return Err(BackendError::Api {
                status: 409,
                code: Some("23503".to_string()),
                message: message.clone(),
            });
        }

        {
            let mut likes = self.likes.write().unwrap();
            if likes.contains(like) {
                return Err(BackendError::Conflict(
                    "duplicate key value violates unique constraint \"likes_post_id_user_id_key\""
                        .to_string(),
                ));
            }
            likes.push(like.clone());
        }

        if let Some(posts) = &self.counters {
            posts.increment_likes(like.post_id);
        }
        Ok(())
    }
}

// ============================================================================
// Mock Image Generator
// ============================================================================

/// Returns `https://img/1`, `https://img/2`, ... in call order
#[derive(Default)]
pub struct MockImageGenerator {
    prompts: Arc<RwLock<Vec<String>>>,
    failure: Option<String>,
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with this function error
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, _session: &Session, prompt: &str) -> Result<String, BackendError> {
        if let Some(message) = &self.failure {
            return Err(BackendError::Function(message.clone()));
        }

        let mut prompts = self.prompts.write().unwrap();
        prompts.push(prompt.to_string());
        Ok(format!("https://img/{}", prompts.len()))
    }
}

// ============================================================================
// Mock Auth Provider
// ============================================================================

struct Account {
    password: String,
    user: User,
}

/// Issues `access-<user>-<n>` tokens with single-use `refresh-<n>` tokens
#[derive(Default)]
pub struct MockAuthProvider {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    refresh_tokens: RwLock<HashMap<String, User>>,
    last_access_token: RwLock<Option<String>>,
    issued: AtomicUsize,
    requires_confirmation: bool,
    expired_sessions: bool,
    no_refresh_tokens: bool,
    refresh_unavailable: AtomicBool,
    sign_up_calls: AtomicUsize,
    sign_in_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a registered account
    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.accounts.write().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: User {
                    id: UserId(Uuid::new_v4()),
                    email: Some(email.to_string()),
                },
            },
        );
        self
    }

    /// Sign-ups create the account but return no session
    pub fn requiring_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Sign-ups and sign-ins hand out sessions that have already expired;
    /// refreshed sessions are good for an hour
    pub fn issuing_expired_sessions(mut self) -> Self {
        self.expired_sessions = true;
        self
    }

    /// Sessions come without a refresh token
    pub fn without_refresh_tokens(mut self) -> Self {
        self.no_refresh_tokens = true;
        self
    }

    /// Forget every outstanding refresh token, as a provider-side sign-out does
    pub fn revoke_refresh_tokens(&self) {
        self.refresh_tokens.write().unwrap().clear();
    }

    /// Make refreshes fail as if the provider were down
    pub fn set_refresh_unavailable(&self, unavailable: bool) {
        self.refresh_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Access token of the most recently issued session
    pub fn last_access_token(&self) -> Option<String> {
        self.last_access_token.read().unwrap().clone()
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn issue(&self, user: &User, expired: bool) -> Session {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access_token = format!("access-{}-{}", user.id, n);
        let refresh_token = if self.no_refresh_tokens {
            None
        } else {
            let token = format!("refresh-{}", n);
            self.refresh_tokens
                .write()
                .unwrap()
                .insert(token.clone(), user.clone());
            Some(token)
        };
        let expires_at = if expired {
            Utc::now() - Duration::minutes(5)
        } else {
            Utc::now() + Duration::hours(1)
        };
        *self.last_access_token.write().unwrap() = Some(access_token.clone());

        Session {
            user: user.clone(),
            access_token,
            refresh_token,
            expires_at: Some(expires_at),
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, request: &SignUp) -> Result<SignUpOutcome, BackendError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);

        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(&request.email) {
            return Err(BackendError::Api {
                status: 422,
                code: Some("user_already_exists".to_string()),
                message: "User already registered".to_string(),
            });
        }

        let user = User {
            id: UserId(Uuid::new_v4()),
            email: Some(request.email.clone()),
        };
        accounts.insert(
            request.email.clone(),
            Account {
                password: request.password.clone(),
                user: user.clone(),
            },
        );

        let session = if self.requires_confirmation {
            None
        } else {
            Some(self.issue(&user, self.expired_sessions))
        };
        Ok(SignUpOutcome { user, session })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

        let accounts = self.accounts.read().unwrap();
        match accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => {
                Ok(self.issue(&account.user, self.expired_sessions))
            }
            _ => Err(BackendError::Api {
                status: 400,
                code: Some("invalid_credentials".to_string()),
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if self.refresh_unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 503,
                code: None,
                message: "Service Unavailable".to_string(),
            });
        }

        let user = self.refresh_tokens.write().unwrap().remove(refresh_token);
        match user {
            Some(user) => Ok(self.issue(&user, false)),
            None => Err(BackendError::Api {
                status: 400,
                code: Some("refresh_token_not_found".to_string()),
                message: "Invalid Refresh Token: Refresh Token Not Found".to_string(),
            }),
        }
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), BackendError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Session contexts
// ============================================================================

/// A bare session never renews
#[async_trait]
impl SessionContext for Session {
    fn current(&self) -> Session {
        self.clone()
    }

    async fn renew(&self, _rejected: &Session) -> bool {
        false
    }
}

/// Renewals swap in `renewed-1`, `renewed-2`, ... as the access token
pub struct RenewingSession {
    session: RwLock<Session>,
    refuse: bool,
    renewals: AtomicUsize,
}

impl RenewingSession {
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
            refuse: false,
            renewals: AtomicUsize::new(0),
        }
    }

    /// Every renewal fails
    pub fn refusing(session: Session) -> Self {
        Self {
            refuse: true,
            ..Self::new(session)
        }
    }

    pub fn renewals(&self) -> usize {
        self.renewals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionContext for RenewingSession {
    fn current(&self) -> Session {
        self.session.read().unwrap().clone()
    }

    async fn renew(&self, _rejected: &Session) -> bool {
        let n = self.renewals.fetch_add(1, Ordering::SeqCst) + 1;
        if self.refuse {
            return false;
        }
        self.session.write().unwrap().access_token = format!("renewed-{}", n);
        true
    }
}

// ============================================================================
// Wiring helpers
// ============================================================================

/// Build the type-erased feed service the server uses, over in-memory mocks
pub fn dyn_feed_service(
    posts: &Arc<InMemoryPostRepository>,
    likes: &Arc<InMemoryLikeRepository>,
    images: &Arc<MockImageGenerator>,
) -> DynFeedService {
    let posts: Arc<dyn PostRepository> = posts.clone();
    let likes: Arc<dyn LikeRepository> = likes.clone();
    let images: Arc<dyn ImageGenerator> = images.clone();
    FeedService::new(posts, likes, images)
}
