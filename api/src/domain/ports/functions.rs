//! Callable function port traits
//!
//! Edge functions hosted by the backend. The only one used today is
//! `generate-image`.

use async_trait::async_trait;

use crate::domain::entities::Session;
use crate::error::BackendError;

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for `prompt` and return its URL
    async fn generate(&self, session: &Session, prompt: &str) -> Result<String, BackendError>;
}
