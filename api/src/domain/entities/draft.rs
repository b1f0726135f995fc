//! Draft domain entity
//!
//! The client-local, not yet submitted post: text plus generated images.
//! Lifecycle: `Empty -> Editing -> Submitting -> Empty` on success,
//! or back to `Editing` (content and images kept) on failure.
//! Images generated while a submission is in flight are held back and join
//! the draft once it settles.

use serde::Serialize;

use super::post::has_postable_content;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Empty,
    Editing,
    Submitting,
}

/// Snapshot of a draft taken when submission starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSubmission {
    pub content: String,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    content: String,
    image_urls: Vec<String>,
    /// Generated during a submission; not part of it
    #[serde(skip_serializing_if = "Vec::is_empty")]
    queued_image_urls: Vec<String>,
    state: DraftState,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            image_urls: Vec::new(),
            queued_image_urls: Vec::new(),
            state: DraftState::Empty,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn queued_image_urls(&self) -> &[String] {
        &self.queued_image_urls
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    /// At least one of content or images is present
    pub fn is_submittable(&self) -> bool {
        has_postable_content(&self.content, &self.image_urls)
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.content = content.into();
        self.settle();
        Ok(())
    }

    /// Append a generated image to the pending list.
    ///
    /// While submitting, the image is queued and appended by `finish_submit`.
    pub fn add_image(&mut self, url: impl Into<String>) {
        if self.state == DraftState::Submitting {
            self.queued_image_urls.push(url.into());
            return;
        }
        self.image_urls.push(url.into());
        self.settle();
    }

    /// Remove the pending image at `index`, keeping the order of the rest
    pub fn remove_image(&mut self, index: usize) -> Result<String, DomainError> {
        self.ensure_editable()?;
        if index >= self.image_urls.len() {
            return Err(DomainError::Validation(format!(
                "No pending image at index {} ({} pending)",
                index,
                self.image_urls.len()
            )));
        }
        let removed = self.image_urls.remove(index);
        self.settle();
        Ok(removed)
    }

    /// Move to `Submitting` and hand out what should be posted.
    ///
    /// Returns `None` when there is nothing to post; the draft is left untouched.
    pub fn begin_submit(&mut self) -> Result<Option<DraftSubmission>, DomainError> {
        self.ensure_editable()?;
        if !self.is_submittable() {
            return Ok(None);
        }
        self.state = DraftState::Submitting;
        Ok(Some(DraftSubmission {
            content: self.content.clone(),
            image_urls: self.image_urls.clone(),
        }))
    }

    /// Leave `Submitting`: cleared on success, kept for retry on failure
    pub fn finish_submit(&mut self, succeeded: bool) {
        if self.state != DraftState::Submitting {
            return;
        }
        if succeeded {
            self.content.clear();
            self.image_urls.clear();
        }
        self.image_urls.append(&mut self.queued_image_urls);
        self.state = DraftState::Editing;
        self.settle();
    }

    fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.state == DraftState::Submitting {
            return Err(DomainError::Conflict(
                "A post is already being submitted".to_string(),
            ));
        }
        Ok(())
    }

    fn settle(&mut self) {
        if self.state == DraftState::Submitting {
            return;
        }
        self.state = if self.content.is_empty() && self.image_urls.is_empty() {
            DraftState::Empty
        } else {
            DraftState::Editing
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_images(urls: &[&str]) -> Draft {
        let mut draft = Draft::new();
        for url in urls {
            draft.add_image(*url);
        }
        draft
    }

    #[test]
    fn starts_empty() {
        let draft = Draft::new();
        assert_eq!(draft.state(), DraftState::Empty);
        assert!(!draft.is_submittable());
    }

    #[test]
    fn editing_after_content_or_image() {
        let mut draft = Draft::new();
        draft.set_content("Hello").unwrap();
        assert_eq!(draft.state(), DraftState::Editing);

        draft.set_content("").unwrap();
        assert_eq!(draft.state(), DraftState::Empty);

        draft.add_image("https://img/1");
        assert_eq!(draft.state(), DraftState::Editing);
    }

    #[test]
    fn remove_image_preserves_order() {
        let mut draft = draft_with_images(&["a", "b", "c", "d"]);
        let removed = draft.remove_image(1).unwrap();
        assert_eq!(removed, "b");
        assert_eq!(draft.image_urls(), &["a", "c", "d"]);
    }

    #[test]
    fn remove_every_position() {
        let urls = ["a", "b", "c"];
        for i in 0..urls.len() {
            let mut draft = draft_with_images(&urls);
            draft.remove_image(i).unwrap();
            let expected: Vec<&str> = urls
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, u)| *u)
                .collect();
            assert_eq!(draft.image_urls(), expected.as_slice());
        }
    }

    #[test]
    fn remove_last_image_empties_draft() {
        let mut draft = draft_with_images(&["a"]);
        draft.remove_image(0).unwrap();
        assert_eq!(draft.state(), DraftState::Empty);
    }

    #[test]
    fn remove_out_of_range() {
        let mut draft = draft_with_images(&["a"]);
        assert!(matches!(
            draft.remove_image(1),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(draft.image_urls().len(), 1);
    }

    #[test]
    fn begin_submit_on_empty_is_noop() {
        let mut draft = Draft::new();
        draft.set_content("   ").unwrap();
        assert_eq!(draft.begin_submit().unwrap(), None);
        assert_eq!(draft.state(), DraftState::Editing);
    }

    #[test]
    fn submit_success_clears() {
        let mut draft = Draft::new();
        draft.set_content("Hello world").unwrap();
        draft.add_image("https://img/1");

        let submission = draft.begin_submit().unwrap().unwrap();
        assert_eq!(submission.content, "Hello world");
        assert_eq!(submission.image_urls, vec!["https://img/1"]);
        assert_eq!(draft.state(), DraftState::Submitting);

        draft.finish_submit(true);
        assert_eq!(draft.state(), DraftState::Empty);
        assert!(draft.content().is_empty());
        assert!(draft.image_urls().is_empty());
    }

    #[test]
    fn submit_failure_keeps_draft() {
        let mut draft = Draft::new();
        draft.set_content("Hello world").unwrap();
        draft.begin_submit().unwrap();

        draft.finish_submit(false);
        assert_eq!(draft.state(), DraftState::Editing);
        assert_eq!(draft.content(), "Hello world");
    }

    #[test]
    fn no_edits_while_submitting() {
        let mut draft = Draft::new();
        draft.set_content("Hello").unwrap();
        draft.begin_submit().unwrap();

        assert!(matches!(
            draft.set_content("changed"),
            Err(DomainError::Conflict(_))
        ));
        assert!(draft.remove_image(0).is_err());
        assert!(draft.begin_submit().is_err());
    }

    #[test]
    fn image_generated_while_submitting_joins_cleared_draft() {
        let mut draft = draft_with_images(&["a"]);
        draft.set_content("Hello").unwrap();
        let submission = draft.begin_submit().unwrap().unwrap();

        draft.add_image("b");
        assert_eq!(draft.image_urls(), &["a"]);
        assert_eq!(draft.queued_image_urls(), &["b"]);
        assert_eq!(submission.image_urls, vec!["a"]);

        draft.finish_submit(true);
        assert_eq!(draft.image_urls(), &["b"]);
        assert!(draft.queued_image_urls().is_empty());
        assert!(draft.content().is_empty());
        assert_eq!(draft.state(), DraftState::Editing);
    }

    #[test]
    fn image_generated_while_submitting_follows_kept_images_on_failure() {
        let mut draft = draft_with_images(&["a"]);
        draft.begin_submit().unwrap();
        draft.add_image("b");
        draft.add_image("c");

        draft.finish_submit(false);
        assert_eq!(draft.image_urls(), &["a", "b", "c"]);
        assert!(draft.queued_image_urls().is_empty());
    }
}
