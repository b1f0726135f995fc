//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod feed_service;
pub mod feed_view_model;
pub mod notification;
pub mod session_context;
pub mod session_service;

use crate::domain::ports::{AuthProvider, ImageGenerator, LikeRepository, PostRepository};

pub use feed_service::FeedService;
pub use notification::{ActionError, Notification};
pub use session_service::{SessionPolicy, SessionService, SessionState};

/// Feed service over whichever backend the server was wired with
pub type DynFeedService = FeedService<dyn PostRepository, dyn LikeRepository, dyn ImageGenerator>;

/// Session service over whichever auth provider the server was wired with
pub type DynSessionService = SessionService<dyn AuthProvider>;
