//! Feed view-model
//!
//! Per-session state behind the feed page: the last fetched post list and the
//! draft being composed. Every successful mutation is followed by a full
//! re-fetch; counters are never bumped locally.
//!
//! Fetches are ticketed. A response is applied only if no newer fetch has
//! already been applied, so a slow, older response cannot overwrite the list.
//!
//! Backend calls go through `with_renewal`: a rejected access token is
//! refreshed once and the call repeated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::app::notification::{ActionError, Notification};
use crate::app::session_context::{with_renewal, SessionContext};
use crate::app::DynFeedService;
use crate::domain::entities::{Draft, LikeOutcome, Post, PostId};
use crate::error::{AppError, DomainError};

#[derive(Default)]
struct PostList {
    posts: Vec<Post>,
    /// Ticket of the fetch whose response is currently shown
    applied: u64,
}

#[derive(Default)]
pub struct FeedViewModel {
    posts: Mutex<PostList>,
    next_ticket: AtomicU64,
    draft: Mutex<Draft>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FeedViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current post list
    pub fn posts(&self) -> Vec<Post> {
        lock(&self.posts).posts.clone()
    }

    /// Snapshot of the current draft
    pub fn draft(&self) -> Draft {
        lock(&self.draft).clone()
    }

    /// Re-fetch the feed. On error the previous list stays in place.
    ///
    /// Returns whether the response was applied.
    pub async fn refresh(&self, service: &DynFeedService, session: &dyn SessionContext) -> bool {
        let ticket = self.begin_fetch();
        let fetched =
            with_renewal(session, |s| async move { service.fetch_recent(&s).await }).await;
        match fetched {
            Ok(posts) => self.apply_fetch(ticket, posts),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching posts");
                false
            }
        }
    }

    pub(crate) fn begin_fetch(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn apply_fetch(&self, ticket: u64, posts: Vec<Post>) -> bool {
        let mut list = lock(&self.posts);
        if ticket <= list.applied {
            tracing::debug!(ticket, applied = list.applied, "Dropping stale feed response");
            return false;
        }
        list.posts = posts;
        list.applied = ticket;
        true
    }

    pub fn set_content(&self, content: &str) -> Result<(), AppError> {
        lock(&self.draft).set_content(content)?;
        Ok(())
    }

    /// Remove the pending image at `index`; purely local
    pub fn remove_image(&self, index: usize) -> Result<String, AppError> {
        Ok(lock(&self.draft).remove_image(index)?)
    }

    /// Submit the draft as a new post.
    ///
    /// `Ok(None)` means there was nothing to post and no request was made.
    /// On success the draft is cleared and the feed re-fetched; on failure
    /// the draft is kept as it was.
    pub async fn submit_draft(
        &self,
        service: &DynFeedService,
        session: &dyn SessionContext,
    ) -> Result<Option<Notification>, ActionError> {
        let begun = {
            let mut draft = lock(&self.draft);
            draft.begin_submit()
        };
        let submission = match begun {
            Ok(Some(submission)) => submission,
            Ok(None) => return Ok(None),
            Err(e) => return Err(ActionError::new("Error creating post", e.into())),
        };

        let content = submission.content.as_str();
        let image_urls = submission.image_urls.as_slice();
        let result = with_renewal(session, |s| async move {
            service.create_post(&s, content, image_urls).await
        })
        .await;

        {
            let mut draft = lock(&self.draft);
            draft.finish_submit(result.is_ok());
        }

        match result {
            Ok(()) => {
                self.refresh(service, session).await;
                Ok(Some(Notification::success(
                    "Post created!",
                    "Your story has been shared",
                )))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error creating post");
                Err(ActionError::new("Error creating post", e))
            }
        }
    }

    /// Like a post and re-fetch.
    ///
    /// A repeated like counts as success. Any other failure is logged only:
    /// the user sees nothing and the feed is not re-fetched.
    pub async fn like(
        &self,
        service: &DynFeedService,
        session: &dyn SessionContext,
        post_id: PostId,
    ) -> Option<LikeOutcome> {
        let liked = with_renewal(session, |s| async move {
            service.like_post(&s, post_id).await
        })
        .await;
        match liked {
            Ok(outcome) => {
                self.refresh(service, session).await;
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, post_id = %post_id, "Error liking post");
                None
            }
        }
    }

    /// Generate an image and append it to the draft's pending images.
    ///
    /// An image that arrives while the draft is being submitted is queued
    /// and lands in the draft when the submission finishes.
    pub async fn generate_image(
        &self,
        service: &DynFeedService,
        session: &dyn SessionContext,
        prompt: &str,
    ) -> Result<Notification, ActionError> {
        let generated = with_renewal(session, |s| async move {
            service.generate_image(&s, prompt).await
        })
        .await;
        let url = match generated {
            Ok(url) => url,
            Err(e @ AppError::Domain(DomainError::Validation(_))) => {
                return Err(ActionError::with_description(
                    "Prompt required",
                    "Please enter a description for the image",
                    e,
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "Error generating image");
                let message = e.user_message();
                let description: &str = if message.is_empty() {
                    "Please try again"
                } else {
                    &message
                };
                return Err(ActionError::with_description(
                    "Error generating image",
                    description,
                    e,
                ));
            }
        };

        lock(&self.draft).add_image(url);

        Ok(Notification::success(
            "Image generated!",
            "Your AI image has been created",
        ))
    }
}
