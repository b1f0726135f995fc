//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod auth;
pub mod functions;
pub mod repositories;

pub use auth::AuthProvider;
pub use functions::ImageGenerator;
pub use repositories::{LikeRepository, PostRepository};
