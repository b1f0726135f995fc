//! Repository port traits
//!
//! These traits define the interface for feed persistence.
//! Implementations are provided by adapters (e.g., Supabase PostgREST).
//! Every call carries the caller's `Session` explicitly.

use async_trait::async_trait;

use crate::domain::entities::{NewLike, NewPost, Post, Session};
use crate::error::BackendError;

/// Repository for Post entities
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Most recent posts, newest first, with author profiles embedded
    async fn fetch_recent(&self, session: &Session, limit: usize)
        -> Result<Vec<Post>, BackendError>;

    /// Insert one post row
    async fn create(&self, session: &Session, post: &NewPost) -> Result<(), BackendError>;
}

/// Repository for Like join rows
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert a like row.
    ///
    /// Must fail with `BackendError::Conflict` when the (post, user) pair already exists.
    async fn create(&self, session: &Session, like: &NewLike) -> Result<(), BackendError>;
}
