//! Feed module
//!
//! Markdown rendering of the feed page.

pub mod renderer;

pub use renderer::render_feed;
