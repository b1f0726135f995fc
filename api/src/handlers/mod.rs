//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod auth;
pub mod draft;
pub mod feed;

pub use auth::{sign_in, sign_out, sign_up};
pub use draft::{generate_image, get_draft, remove_image, set_content, submit_draft};
pub use feed::{get_feed, like_post};
