//! Supabase like repository (PostgREST `likes` table)
//!
//! The table has a unique (post_id, user_id) constraint; a repeated like comes
//! back as SQLSTATE 23505, which the client classifies as `Conflict`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::SupabaseClient;
use crate::domain::entities::{NewLike, Session};
use crate::domain::ports::LikeRepository;
use crate::error::BackendError;

pub struct SupabaseLikeRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseLikeRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct InsertLikeRequest {
    post_id: uuid::Uuid,
    user_id: uuid::Uuid,
}

#[async_trait]
impl LikeRepository for SupabaseLikeRepository {
    async fn create(&self, session: &Session, like: &NewLike) -> Result<(), BackendError> {
        let response = self
            .client
            .request(
                Method::POST,
                &self.client.rest_url("/likes"),
                Some(&session.access_token),
            )
            .header("Prefer", "return=minimal")
            .json(&InsertLikeRequest {
                post_id: like.post_id.0,
                user_id: like.user_id.0,
            })
            .send()
            .await?;

        self.client.handle_empty_response(response).await
    }
}
