//! Supabase adapter
//!
//! Implementations of the feed ports against a hosted Supabase project:
//! PostgREST tables, GoTrue auth and edge functions.

pub mod auth;
pub mod client;
pub mod functions;
pub mod like_repo;
pub mod post_repo;

pub use auth::SupabaseAuthProvider;
pub use client::SupabaseClient;
pub use functions::SupabaseImageGenerator;
pub use like_repo::SupabaseLikeRepository;
pub use post_repo::SupabasePostRepository;
