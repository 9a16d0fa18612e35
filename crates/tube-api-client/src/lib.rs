//! HTTP client for the PeerTube REST API.
//!
//! Provides a minimal client with optional Bearer auth, generic GET/POST
//! helpers, and domain methods (login, channel lookup, channel video pages,
//! upload, description). No request is retried; every failure surfaces.

pub mod api;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// API prefix of every PeerTube endpoint used here.
pub const API_PREFIX: &str = "/api/v1";

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// Anonymous requests (public endpoints only)
    None,
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

/// HTTP client for a PeerTube instance.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: Auth) -> ApiResult<Self> {
        // Uploads of large originals can take a long time; only connecting is bounded
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Same server, different credentials.
    pub fn with_auth(&self, auth: Auth) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            auth,
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = self.apply_auth(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: T = response.json().await?;
        Ok(body)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send_json(request).await
    }

    /// POST an urlencoded form and deserialize response.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> ApiResult<T> {
        let request = self.client.post(self.build_url(path)).form(form);
        self.send_json(request).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        self.send_json(request).await
    }
}

pub use api::{ListResponse, UploadedVideo, VideoUploadParams};
