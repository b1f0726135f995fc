//! Domain layer
//!
//! Feed rules with no I/O of their own.
//! - `entities`: posts, likes, drafts, sessions
//! - `ports`: traits the backend collaborator must implement

pub mod entities;
pub mod ports;
