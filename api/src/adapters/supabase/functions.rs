//! Supabase edge function adapters

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::SupabaseClient;
use crate::domain::entities::Session;
use crate::domain::ports::ImageGenerator;
use crate::error::BackendError;

const GENERATE_IMAGE: &str = "generate-image";

pub struct SupabaseImageGenerator {
    client: Arc<SupabaseClient>,
}

impl SupabaseImageGenerator {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct GenerateImageRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateImageResponse {
    #[serde(default)]
    success: bool,
    image_url: Option<String>,
    error: Option<String>,
}

impl GenerateImageResponse {
    fn into_url(self) -> Result<String, BackendError> {
        match self.image_url {
            Some(url) if self.success && !url.is_empty() => Ok(url),
            _ => Err(BackendError::Function(
                self.error
                    .unwrap_or_else(|| "Failed to generate image".to_string()),
            )),
        }
    }
}

#[async_trait]
impl ImageGenerator for SupabaseImageGenerator {
    async fn generate(&self, session: &Session, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .request(
                Method::POST,
                &self.client.functions_url(GENERATE_IMAGE),
                Some(&session.access_token),
            )
            .json(&GenerateImageRequest { prompt })
            .send()
            .await?;

        let body: GenerateImageResponse = self.client.handle_response(response).await?;
        body.into_url()
    }
}
