//! Embedded metadata of local video files, read with ffprobe.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;

use crate::error::{SyncError, SyncResult};

/// Validate that a path doesn't contain shell metacharacters
fn validate_executable(path: &str) -> SyncResult<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(SyncError::Metadata(format!(
            "Invalid ffprobe path: {}",
            path
        )));
    }
    Ok(())
}

/// Fields of interest pulled out of an ffprobe report.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    /// Full ffprobe output
    pub raw: Value,
}

impl VideoMetadata {
    /// Interpret ffprobe's JSON (`-show_format -show_streams`).
    ///
    /// Container tags vary in case between formats (`title` in MP4, `TITLE`
    /// in Matroska), so tag names are matched case-insensitively. Blank tags
    /// count as absent.
    pub fn from_probe(raw: Value) -> Self {
        let format = &raw["format"];
        let tags = &format["tags"];

        let title = tag(tags, "title");
        let description = tag(tags, "comment").or_else(|| tag(tags, "description"));
        let creation_time = tag(tags, "creation_time").and_then(|t| {
            DateTime::parse_from_rfc3339(&t)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });
        let duration = format["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok());

        Self {
            title,
            description,
            creation_time,
            duration,
            raw,
        }
    }
}

fn tag(tags: &Value, name: &str) -> Option<String> {
    tags.as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Runs ffprobe against local files.
#[derive(Debug, Clone)]
pub struct VideoProbe {
    ffprobe_path: String,
}

impl VideoProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> SyncResult<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe(&self, video_path: &Path) -> SyncResult<VideoMetadata> {
        let start = Instant::now();

        let path: PathBuf = tokio::fs::canonicalize(video_path)
            .await
            .map_err(|e| SyncError::io(video_path, e))?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(&path)
            .output()
            .await
            .map_err(|e| {
                SyncError::Metadata(format!(
                    "Failed to execute {}: {}",
                    self.ffprobe_path, e
                ))
            })?;

        if !output.status.success() {
            return Err(SyncError::Metadata(format!(
                "ffprobe failed on {} ({}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let raw: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            SyncError::Metadata(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let metadata = VideoMetadata::from_probe(raw);

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            video_duration_secs = ?metadata.duration,
            has_title = metadata.title.is_some(),
            has_description = metadata.description.is_some(),
            has_creation_time = metadata.creation_time.is_some(),
            "Video probe completed"
        );

        Ok(metadata)
    }
}
