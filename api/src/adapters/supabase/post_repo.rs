//! Supabase post repository (PostgREST `posts` table)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use super::SupabaseClient;
use crate::domain::entities::{image_urls_from_json, NewPost, Post, PostId, Profile, Session};
use crate::domain::ports::PostRepository;
use crate::error::BackendError;

/// Columns of the feed query, with the author profile embedded
pub(crate) const FEED_SELECT: &str = "id,content,like_count,comment_count,created_at,image_urls,profiles(username,display_name,profile_picture_url)";

pub struct SupabasePostRepository {
    client: Arc<SupabaseClient>,
}

impl SupabasePostRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

/// Row shape returned by the feed query
#[derive(Deserialize)]
struct PostRow {
    id: uuid::Uuid,
    content: Option<String>,
    #[serde(default)]
    like_count: Option<i32>,
    #[serde(default)]
    comment_count: Option<i32>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    image_urls: Option<serde_json::Value>,
    #[serde(default)]
    profiles: Option<ProfileRow>,
}

#[derive(Deserialize)]
struct ProfileRow {
    username: String,
    display_name: Option<String>,
    profile_picture_url: Option<String>,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Post {
            id: PostId(r.id),
            author: r.profiles.map(|p| Profile {
                username: p.username,
                display_name: p.display_name,
                profile_picture_url: p.profile_picture_url,
            }),
            content: r.content,
            image_urls: image_urls_from_json(r.image_urls),
            like_count: r.like_count.unwrap_or(0).max(0),
            comment_count: r.comment_count.unwrap_or(0).max(0),
            created_at: r.created_at,
        }
    }
}

#[derive(Serialize)]
struct InsertPostRequest<'a> {
    content: &'a str,
    user_id: uuid::Uuid,
    image_urls: &'a [String],
}

#[async_trait]
impl PostRepository for SupabasePostRepository {
    async fn fetch_recent(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<Post>, BackendError> {
        let url = format!(
            "{}?select={}&order=created_at.desc&limit={}",
            self.client.rest_url("/posts"),
            encode(FEED_SELECT),
            limit
        );

        let response = self
            .client
            .request(Method::GET, &url, Some(&session.access_token))
            .send()
            .await?;

        let rows: Vec<PostRow> = self.client.handle_response(response).await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn create(&self, session: &Session, post: &NewPost) -> Result<(), BackendError> {
        let response = self
            .client
            .request(
                Method::POST,
                &self.client.rest_url("/posts"),
                Some(&session.access_token),
            )
            .header("Prefer", "return=minimal")
            .json(&InsertPostRequest {
                content: &post.content,
                user_id: post.user_id.0,
                image_urls: &post.image_urls,
            })
            .send()
            .await?;

        self.client.handle_empty_response(response).await
    }
}
