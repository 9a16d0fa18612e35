//! Markdown README for a channel: header, description, then one section per video.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use regex::Regex;
use tube_api_client::ApiClient;
use tube_core::{RemoteVideoRecord, VideoChannel};

use crate::catalog::{video_catalog, VideoPageSource};
use crate::error::{SyncError, SyncResult};

/// Lines of each video description kept in the listing.
const DESCRIPTION_LINES: usize = 3;

/// Full description lookup for a single video.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    async fn description(&self, video: &RemoteVideoRecord) -> SyncResult<String>;
}

#[async_trait]
impl DescriptionSource for ApiClient {
    async fn description(&self, video: &RemoteVideoRecord) -> SyncResult<String> {
        let id = video
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| video.uuid.clone());
        Ok(self.get_video_description(&id).await?)
    }
}

#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Public URL of the instance, without trailing slash
    pub server_url: String,
    pub page_size: usize,
    /// Description requests in flight at once
    pub concurrency: usize,
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// GitHub-style heading anchor: lowercase, spaces become hyphens, other
/// punctuation is dropped.
pub fn anchor_slug(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c.to_lowercase().collect::<String>())
            } else if c.is_whitespace() {
                Some("-".to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Rewrite `[label](<server>/w/<id>)` links into `[label](#<slug>)`.
///
/// Every video gets a section in the same document, so links to a video on
/// the instance become links to its section.
pub fn rewrite_video_links(server_url: &str, text: &str) -> SyncResult<String> {
    let pattern = format!(r"\[(.*?)\]\({}/w/[a-zA-Z0-9]+\)", regex::escape(server_url));
    let links = Regex::new(&pattern)
        .map_err(|e| SyncError::InvalidInput(format!("Bad server URL {}: {}", server_url, e)))?;

    Ok(links
        .replace_all(text, |caps: &regex::Captures| {
            format!("[{}](#{})", &caps[1], anchor_slug(&caps[1]))
        })
        .into_owned())
}

/// Header section for `channel`.
pub fn render_channel_header(server_url: &str, channel: &VideoChannel) -> SyncResult<String> {
    let description = normalize_newlines(channel.description.as_deref().unwrap_or_default());
    let description = rewrite_video_links(server_url, &description)?;

    let text = [
        format!(
            "# [{}]({}/c/{}/)",
            channel.display_name, server_url, channel.name
        ),
        String::new(),
        "![](./banner.jpg)".to_string(),
        String::new(),
        description,
    ]
    .join("\n");

    Ok(text + "\n\n")
}

/// Section for one video, given its full description.
pub fn render_video_section(
    server_url: &str,
    video: &RemoteVideoRecord,
    description: &str,
) -> String {
    let url = video.url.clone().unwrap_or_default();
    let short_description = normalize_newlines(description)
        .split('\n')
        .take(DESCRIPTION_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let text = [
        format!("## [{}]({})", video.name, url),
        String::new(),
        format!(
            "[![{}]({}{})]({})",
            video.name,
            server_url,
            video.thumbnail_path.as_deref().unwrap_or_default(),
            url
        ),
        String::new(),
        short_description,
    ]
    .join("\n");

    text + "\n\n"
}

/// Render the whole listing, videos in catalog order.
///
/// Descriptions are fetched with up to `concurrency` requests in flight;
/// `try_buffered` keeps results in the order the catalog yielded them.
pub async fn render_channel_readme<V, D>(
    channel: &VideoChannel,
    videos: &V,
    descriptions: &D,
    options: &ListingOptions,
) -> SyncResult<String>
where
    V: VideoPageSource + ?Sized,
    D: DescriptionSource + ?Sized,
{
    let server_url = options.server_url.trim_end_matches('/');
    let mut readme = render_channel_header(server_url, channel)?;

    let sections: Vec<String> = video_catalog(videos, options.page_size)
        .map_ok(|video| async move {
            let description = descriptions.description(&video).await?;
            Ok::<_, SyncError>(render_video_section(server_url, &video, &description))
        })
        .try_buffered(options.concurrency.max(1))
        .try_collect()
        .await?;

    tracing::info!(
        channel = %channel.name,
        videos = sections.len(),
        "Rendered channel listing"
    );

    for section in sections {
        readme.push_str(&section);
    }
    Ok(readme)
}
