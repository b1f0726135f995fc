//! Supabase HTTP client
//!
//! Thin wrapper over `reqwest` shared by the REST, auth and functions adapters.
//! Knows the URL layout, the auth headers and how to turn error bodies into
//! `BackendError`s.

use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

use crate::error::BackendError;

/// PostgreSQL SQLSTATE for unique_violation, as reported by PostgREST
const UNIQUE_VIOLATION: &str = "23505";

pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1{}", self.base_url, path)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    pub fn functions_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// Start a request carrying the anon key and a bearer token.
    ///
    /// Without an access token the anon key doubles as the bearer.
    pub fn request(&self, method: Method, url: &str, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    pub async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| BackendError::Deserialization(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_error(status.as_u16(), &body))
        }
    }

    pub async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), BackendError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_error(status.as_u16(), &body))
        }
    }
}

/// Error body shapes returned by PostgREST and GoTrue, merged.
///
/// PostgREST: `{code, message, details, hint}` with a string SQLSTATE code.
/// GoTrue: `{code, msg}` (numeric code), `{error, error_description}`, or
/// `{code, error_code, msg}` on newer versions.
#[derive(Deserialize, Default)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    error_code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            _ => self.error_code.clone(),
        }
    }

    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }
}

/// Map a failed response to a structured error.
///
/// Unique violations become `Conflict` so callers never match on message text.
pub(crate) fn classify_error(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code();
    let message = parsed.message().unwrap_or_else(|| {
        if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body.to_string()
        }
    });

    // PostgREST also answers 409 for foreign key violations; only 23505 is a duplicate
    let duplicate = match code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION,
        None => status == 409,
    };
    if duplicate {
        return BackendError::Conflict(message);
    }

    match status {
        401 => BackendError::Unauthorized(message),
        429 => BackendError::RateLimited,
        _ => BackendError::Api {
            status,
            code,
            message,
        },
    }
}
