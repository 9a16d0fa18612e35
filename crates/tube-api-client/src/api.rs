//! Domain methods for the PeerTube API client.

use crate::{ApiClient, ApiError, ApiResult, Auth, API_PREFIX};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::PathBuf;
use tokio_util::io::ReaderStream;
use tube_core::{RemoteVideoRecord, VideoChannel, VideoPrivacy};

/// Paginated list wrapper (`{ total, data }`). `total` is absent with `skipCount=true`.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub total: Option<u64>,
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct OAuthClient {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    video: UploadedVideo,
}

/// Identifiers PeerTube assigns to a freshly uploaded video.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedVideo {
    pub id: i64,
    pub uuid: String,
    #[serde(default, rename = "shortUUID")]
    pub short_uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescriptionResponse {
    description: Option<String>,
}

/// Fields of a `POST /videos/upload` request.
#[derive(Debug, Clone)]
pub struct VideoUploadParams {
    pub file_path: PathBuf,
    pub channel_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<u32>,
    pub language: String,
    pub originally_published_at: Option<DateTime<Utc>>,
    pub privacy: VideoPrivacy,
    pub wait_transcoding: bool,
}

impl VideoUploadParams {
    pub fn new(file_path: impl Into<PathBuf>, channel_id: i64, name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            channel_id,
            name: name.into(),
            description: None,
            category: None,
            language: "en".to_string(),
            originally_published_at: None,
            privacy: VideoPrivacy::Public,
            wait_transcoding: true,
        }
    }
}

impl ApiClient {
    /// Exchange username/password for a bearer token and return an
    /// authenticated client.
    ///
    /// Uses the instance's local OAuth client, as the PeerTube web UI does.
    pub async fn login(base_url: &str, username: &str, password: &str) -> ApiResult<Self> {
        let anonymous = ApiClient::new(base_url, Auth::None)?;

        let oauth: OAuthClient = anonymous
            .get(&format!("{}/oauth-clients/local", API_PREFIX), &[])
            .await?;

        let token: TokenResponse = anonymous
            .post_form(
                &format!("{}/users/token", API_PREFIX),
                &[
                    ("client_id", oauth.client_id.as_str()),
                    ("client_secret", oauth.client_secret.as_str()),
                    ("grant_type", "password"),
                    ("username", username),
                    ("password", password),
                ],
            )
            .await?;

        tracing::debug!(username = %username, "Obtained PeerTube access token");

        Ok(anonymous.with_auth(Auth::Bearer(token.access_token)))
    }

    /// Look up a channel by handle.
    pub async fn get_channel(&self, channel: &str) -> ApiResult<VideoChannel> {
        self.get(
            &format!(
                "{}/video-channels/{}",
                API_PREFIX,
                urlencoding::encode(channel)
            ),
            &[],
        )
        .await
    }

    /// Fetch one page of a channel's videos, most recently published first.
    ///
    /// `skipCount` spares the server the total count; callers detect the end
    /// of the listing from a short page.
    pub async fn list_channel_videos(
        &self,
        channel: &str,
        start: usize,
        count: usize,
    ) -> ApiResult<Vec<RemoteVideoRecord>> {
        let page: ListResponse<RemoteVideoRecord> = self
            .get(
                &format!(
                    "{}/video-channels/{}/videos",
                    API_PREFIX,
                    urlencoding::encode(channel)
                ),
                &[
                    ("start", start.to_string()),
                    ("count", count.to_string()),
                    ("sort", "-publishedAt".to_string()),
                    ("skipCount", "true".to_string()),
                ],
            )
            .await?;

        tracing::debug!(
            channel = %channel,
            start = start,
            count = count,
            received = page.data.len(),
            "Fetched channel video page"
        );

        Ok(page.data)
    }

    /// Full description of a video (list endpoints only carry a truncated one).
    pub async fn get_video_description(&self, video_id: &str) -> ApiResult<String> {
        let response: DescriptionResponse = self
            .get(
                &format!(
                    "{}/videos/{}/description",
                    API_PREFIX,
                    urlencoding::encode(video_id)
                ),
                &[],
            )
            .await?;

        Ok(response.description.unwrap_or_default())
    }

    /// Upload a video file, streaming it from disk. Returns the assigned identifiers.
    pub async fn upload_video(&self, params: &VideoUploadParams) -> ApiResult<UploadedVideo> {
        let file = tokio::fs::File::open(&params.file_path).await?;
        let length = file.metadata().await?.len();
        let file_name = params
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!(
                    "Invalid file name: {}",
                    params.file_path.display()
                ))
            })?
            .to_string();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let video_part = Part::stream_with_length(body, length).file_name(file_name);

        let form = upload_form(params).part("videofile", video_part);

        let start = std::time::Instant::now();
        let response: UploadResponse = self
            .post_multipart(&format!("{}/videos/upload", API_PREFIX), form)
            .await?;

        tracing::info!(
            uuid = %response.video.uuid,
            size_bytes = length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "PeerTube upload successful"
        );

        Ok(response.video)
    }
}

/// Text fields of the upload form, without the file part.
fn upload_form(params: &VideoUploadParams) -> Form {
    let mut form = Form::new()
        .text("channelId", params.channel_id.to_string())
        .text("name", params.name.clone())
        .text("language", params.language.clone())
        .text("privacy", params.privacy.to_string())
        .text("waitTranscoding", params.wait_transcoding.to_string());

    if let Some(category) = params.category {
        form = form.text("category", category.to_string());
    }
    if let Some(description) = &params.description {
        form = form.text("description", description.clone());
    }
    if let Some(published_at) = params.originally_published_at {
        form = form.text(
            "originallyPublishedAt",
            published_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }

    form
}
