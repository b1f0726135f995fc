//! Post domain entity
//!
//! A user-authored story with optional text and optional images.
//! Posts are owned by the backend; the client only ever holds a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Unique identifier for a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub Uuid);

impl From<Uuid> for PostId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(PostId)
            .map_err(|_| format!("Invalid post id: {}", s))
    }
}

/// Public identity of a post's author, as embedded in the feed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub display_name: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl Profile {
    /// Name to show, falling back to the username
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// Avatar fallback letter: first character of the display name, or 'U'
    pub fn avatar_initial(&self) -> char {
        self.display_name
            .as_deref()
            .and_then(|n| n.trim().chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }
}

/// A post as returned by the feed query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: PostId,
    /// `None` when the author's profile did not resolve
    pub author: Option<Profile>,
    pub content: Option<String>,
    pub image_urls: Vec<String>,
    pub like_count: i32,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Only posts whose author resolved are shown
    pub fn is_displayable(&self) -> bool {
        self.author.is_some()
    }

    /// Non-empty text content, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// Data needed to create a new post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub content: String,
    pub user_id: UserId,
    pub image_urls: Vec<String>,
}

/// Whether a post with this content and these images is worth submitting
pub fn has_postable_content(content: &str, image_urls: &[String]) -> bool {
    !content.trim().is_empty() || !image_urls.is_empty()
}

/// Extract image URLs from the loosely typed `image_urls` column.
///
/// Anything that is not an array yields no images; non-string elements are dropped.
pub fn image_urls_from_json(value: Option<serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
