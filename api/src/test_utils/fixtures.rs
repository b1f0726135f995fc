//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Fixtures are deterministic: the same arguments give equal entities.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::{Post, PostId, Profile, Session, User, UserId};

/// Fixed reference time all fixture timestamps are derived from
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Author profile used by post fixtures
pub fn test_profile() -> Profile {
    Profile {
        username: "testuser".to_string(),
        display_name: Some("Test User".to_string()),
        profile_picture_url: None,
    }
}

/// Create a post created `minutes` after the base time.
///
/// Larger `minutes` means a newer post.
pub fn test_post_at(minutes: i64) -> Post {
    Post {
        id: PostId(Uuid::from_u128(1000 + minutes as u128)),
        author: Some(test_profile()),
        content: Some(format!("Story {}", minutes)),
        image_urls: Vec::new(),
        like_count: 0,
        comment_count: 0,
        created_at: base_time() + Duration::minutes(minutes),
    }
}

/// Create a post whose author profile did not resolve
pub fn test_post_without_author() -> Post {
    Post {
        author: None,
        ..test_post_at(0)
    }
}

/// Create a test user
pub fn test_user() -> User {
    User {
        id: UserId(Uuid::from_u128(42)),
        email: Some("test@example.com".to_string()),
    }
}

/// Create a backend session for the test user
pub fn test_session() -> Session {
    Session {
        user: test_user(),
        access_token: "test-access-token".to_string(),
        refresh_token: None,
        expires_at: None,
    }
}
