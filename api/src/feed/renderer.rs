//! Feed renderer
//!
//! Renders the feed page (draft composer plus post list) to markdown.

use crate::domain::entities::{Draft, DraftState, Post};

/// Render the whole feed page
pub fn render_feed(posts: &[Post], draft: &Draft) -> String {
    let mut buf = String::new();

    buf.push_str("# Story-Tell\n\n");

    buf.push_str(&render_draft(draft));
    buf.push('\n');

    buf.push_str("## Stories\n\n");
    let visible: Vec<&Post> = posts.iter().filter(|p| p.is_displayable()).collect();
    if visible.is_empty() {
        buf.push_str("_No stories yet. Share the first one!_\n\n");
    } else {
        for post in visible {
            buf.push_str(&render_post(post));
            buf.push('\n');
        }
    }

    buf.push_str("---\n\n");
    buf.push_str("## Commands\n\n");
    buf.push_str("- `PUT /draft/content` - Write your story\n");
    buf.push_str("- `POST /draft/images` - Generate an AI image from a prompt\n");
    buf.push_str("- `DELETE /draft/images/N` - Remove pending image N\n");
    buf.push_str("- `POST /draft/submit` - Share your story\n");
    buf.push_str("- `POST /posts/<id>/like` - Like a story\n");
    buf.push_str("- `POST /auth/signout` - Sign out\n");

    buf
}

/// Render a single post card. Returns an empty string for posts whose author did not resolve.
pub fn render_post(post: &Post) -> String {
    let Some(author) = &post.author else {
        return String::new();
    };

    let mut buf = String::new();

    buf.push_str(&format!(
        "### [{}] {} (@{})\n",
        author.avatar_initial(),
        author.name(),
        author.username
    ));
    buf.push_str(&format!(
        "_{}_ | id: `{}`\n\n",
        post.created_at.format("%Y-%m-%d %H:%M UTC"),
        post.id
    ));

    if let Some(text) = post.text() {
        buf.push_str(text);
        buf.push_str("\n\n");
    }

    for (i, url) in post.image_urls.iter().enumerate() {
        buf.push_str(&format!("![Post image {}]({})\n", i + 1, url));
    }
    if !post.image_urls.is_empty() {
        buf.push('\n');
    }

    buf.push_str(&format!(
        "Likes: {} | Comments: {}\n",
        post.like_count, post.comment_count
    ));

    buf
}

/// Render the post composer
pub fn render_draft(draft: &Draft) -> String {
    let mut buf = String::new();

    buf.push_str("## Share your story\n\n");

    match draft.state() {
        DraftState::Empty => {
            buf.push_str("_What's happening?_\n");
            return buf;
        }
        DraftState::Submitting => buf.push_str("_Posting..._\n\n"),
        DraftState::Editing => {}
    }

    if !draft.content().is_empty() {
        for line in draft.content().lines() {
            buf.push_str(&format!("> {}\n", line));
        }
        buf.push('\n');
    }

    if !draft.image_urls().is_empty() {
        buf.push_str("Generated images:\n");
        for (i, url) in draft.image_urls().iter().enumerate() {
            buf.push_str(&format!("- [{}] {}\n", i, truncate(url, 80)));
        }
    }

    if !draft.queued_image_urls().is_empty() {
        buf.push_str(&format!(
            "\n_{} more image(s) will be added once posting finishes_\n",
            draft.queued_image_urls().len()
        ));
    }

    buf
}

/// Truncate a string with ellipsis, on character boundaries
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
