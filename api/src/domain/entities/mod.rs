//! Domain entities
//!
//! Pure domain models for the story feed.
//! Wire shapes used by the Supabase adapter live next to the adapter.

pub mod draft;
pub mod like;
pub mod post;
pub mod user;

pub use draft::{Draft, DraftState};
pub use like::{LikeOutcome, NewLike};
pub use post::{has_postable_content, image_urls_from_json, NewPost, Post, PostId, Profile};
pub use user::{Credentials, Session, SignUp, SignUpOutcome, User, UserId};
