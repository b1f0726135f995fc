//! Feed service
//!
//! The post repository operations: fetch-recent, create, like and
//! generate-image. Each is a single round trip to the backend; there are no
//! retries. Orchestration across calls lives in `FeedViewModel`.

use std::sync::Arc;

use crate::domain::entities::{
    has_postable_content, LikeOutcome, NewLike, NewPost, Post, PostId, Session,
};
use crate::domain::ports::{ImageGenerator, LikeRepository, PostRepository};
use crate::error::{AppError, BackendError, DomainError};

/// Size of the feed page
pub const FEED_PAGE_SIZE: usize = 20;

/// Service for the story feed
pub struct FeedService<PR, LR, IG>
where
    PR: PostRepository + ?Sized,
    LR: LikeRepository + ?Sized,
    IG: ImageGenerator + ?Sized,
{
    posts: Arc<PR>,
    likes: Arc<LR>,
    images: Arc<IG>,
}

impl<PR, LR, IG> FeedService<PR, LR, IG>
where
    PR: PostRepository + ?Sized,
    LR: LikeRepository + ?Sized,
    IG: ImageGenerator + ?Sized,
{
    pub fn new(posts: Arc<PR>, likes: Arc<LR>, images: Arc<IG>) -> Self {
        Self {
            posts,
            likes,
            images,
        }
    }

    /// The most recent `FEED_PAGE_SIZE` posts, newest first, in backend order
    pub async fn fetch_recent(&self, session: &Session) -> Result<Vec<Post>, AppError> {
        let mut posts = self.posts.fetch_recent(session, FEED_PAGE_SIZE).await?;
        posts.truncate(FEED_PAGE_SIZE);
        Ok(posts)
    }

    /// Insert a post for the session's user.
    ///
    /// Rejected without a backend call when both content and images are empty.
    pub async fn create_post(
        &self,
        session: &Session,
        content: &str,
        image_urls: &[String],
    ) -> Result<(), AppError> {
        if !has_postable_content(content, image_urls) {
            return Err(DomainError::Validation(
                "Write something or add an image before sharing".to_string(),
            )
            .into());
        }

        let new_post = NewPost {
            content: content.to_string(),
            user_id: session.user_id(),
            image_urls: image_urls.to_vec(),
        };
        self.posts.create(session, &new_post).await?;

        tracing::info!(
            user_id = %session.user_id(),
            images = image_urls.len(),
            "Post created"
        );
        Ok(())
    }

    /// Like a post; liking twice is not an error
    pub async fn like_post(
        &self,
        session: &Session,
        post_id: PostId,
    ) -> Result<LikeOutcome, AppError> {
        let like = NewLike {
            post_id,
            user_id: session.user_id(),
        };

        match self.likes.create(session, &like).await {
            Ok(()) => Ok(LikeOutcome::Liked),
            Err(BackendError::Conflict(_)) => {
                tracing::debug!(post_id = %post_id, "Post already liked");
                Ok(LikeOutcome::AlreadyLiked)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run the image generation function; blank prompts never reach the backend
    pub async fn generate_image(&self, session: &Session, prompt: &str) -> Result<String, AppError> {
        if prompt.trim().is_empty() {
            return Err(DomainError::Validation(
                "Please enter a description for the image".to_string(),
            )
            .into());
        }

        let url = self.images.generate(session, prompt).await?;
        tracing::info!(user_id = %session.user_id(), "Image generated");
        Ok(url)
    }
}
