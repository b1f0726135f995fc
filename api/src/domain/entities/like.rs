//! Like domain entity
//!
//! A user's endorsement of a post. Unique per (post, user); the backend
//! enforces that and maintains the post's like counter.

use serde::Serialize;

use super::{PostId, UserId};

/// Data needed to record a like
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLike {
    pub post_id: PostId,
    pub user_id: UserId,
}

/// How a like request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeOutcome {
    /// A new like row was inserted
    Liked,
    /// The user had already liked the post; treated as success
    AlreadyLiked,
}
