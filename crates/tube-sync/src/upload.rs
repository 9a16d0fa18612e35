//! Upload orchestration: PeerTube first, then the original to the backup bucket.
//!
//! Per file:
//! 1. fingerprint the content
//! 2. link `created/<fingerprint><ext>` to the source
//! 3. upload to PeerTube
//! 4. write the `uploaded/<fingerprint>` sentinel
//! 5. copy the original to `originals/<uuid><ext>`
//!
//! A failure at any step aborts. The sentinel is written before the backup
//! copy, so a failed backup leaves a video that `missing-backups` reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tube_api_client::{ApiClient, VideoUploadParams};
use tube_core::constants::VIDEO_EXTENSIONS;
use tube_core::{VideoFingerprint, VideoPrivacy};
use tube_storage::{backup_key, BackupStore, LocalState};

use crate::error::{SyncError, SyncResult};
use crate::fingerprint::fingerprint;
use crate::metadata::VideoProbe;

/// Destination that publishes a video and returns its UUID.
#[async_trait]
pub trait VideoPublisher: Send + Sync {
    async fn publish(&self, params: &VideoUploadParams) -> SyncResult<String>;
}

#[async_trait]
impl VideoPublisher for ApiClient {
    async fn publish(&self, params: &VideoUploadParams) -> SyncResult<String> {
        Ok(self.upload_video(params).await?.uuid)
    }
}

/// Per-upload overrides and switches.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub privacy: VideoPrivacy,
    /// Fill missing fields from the file's embedded metadata
    pub use_metadata: bool,
    /// Copy the original to the backup bucket after publishing
    pub backup: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            published_at: None,
            privacy: VideoPrivacy::default(),
            use_metadata: true,
            backup: true,
        }
    }
}

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub path: PathBuf,
    pub fingerprint: VideoFingerprint,
    pub uuid: String,
    pub backup_key: Option<String>,
}

/// Result of uploading a directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryUploadReport {
    pub uploaded: Vec<UploadOutcome>,
    /// Files skipped because their sentinel exists, with the recorded UUID
    pub skipped: Vec<(PathBuf, String)>,
}

pub struct Uploader {
    publisher: Arc<dyn VideoPublisher>,
    backups: Arc<dyn BackupStore>,
    state: LocalState,
    probe: Option<VideoProbe>,
    channel_id: i64,
}

impl Uploader {
    pub fn new(
        publisher: Arc<dyn VideoPublisher>,
        backups: Arc<dyn BackupStore>,
        state: LocalState,
        channel_id: i64,
    ) -> Self {
        Self {
            publisher,
            backups,
            state,
            probe: None,
            channel_id,
        }
    }

    /// Enable metadata enrichment through `probe`.
    pub fn with_probe(mut self, probe: VideoProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    /// Upload one file to PeerTube and, unless disabled, back up the original.
    pub async fn upload_video(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> SyncResult<UploadOutcome> {
        let fingerprint = fingerprint(path).await?;
        if let Some(previous) = self.state.uploaded_uuid(&fingerprint).await? {
            tracing::warn!(
                path = %path.display(),
                fingerprint = %fingerprint,
                previous_uuid = %previous,
                "File was uploaded before, uploading again"
            );
        }

        self.upload_fingerprinted(path, fingerprint, options).await
    }

    async fn upload_fingerprinted(
        &self,
        path: &Path,
        fingerprint: VideoFingerprint,
        options: &UploadOptions,
    ) -> SyncResult<UploadOutcome> {
        let start = Instant::now();

        self.state.record_created(&fingerprint, path).await?;

        let params = self.upload_params(path, options).await?;
        let uuid = self.publisher.publish(&params).await?;

        tracing::info!(
            path = %path.display(),
            fingerprint = %fingerprint,
            uuid = %uuid,
            name = %params.name,
            "Video published"
        );

        self.state.record_uploaded(&fingerprint, &uuid).await?;

        let backup_key = if options.backup {
            Some(self.upload_backup(path, &uuid).await?)
        } else {
            None
        };

        tracing::debug!(
            path = %path.display(),
            duration_ms = start.elapsed().as_millis(),
            "Upload finished"
        );

        Ok(UploadOutcome {
            path: path.to_path_buf(),
            fingerprint,
            uuid,
            backup_key,
        })
    }

    /// Copy `path` to the backup bucket as the original of `uuid`.
    pub async fn upload_backup(&self, path: &Path, uuid: &str) -> SyncResult<String> {
        upload_backup(self.backups.as_ref(), path, uuid).await
    }

    /// Upload every video file directly inside `dir`, in name order.
    ///
    /// Files with an existing sentinel are skipped. The first error aborts
    /// the scan; files uploaded before it stay uploaded.
    pub async fn upload_dir(
        &self,
        dir: &Path,
        options: &UploadOptions,
    ) -> SyncResult<DirectoryUploadReport> {
        let files = video_files(dir).await?;
        let mut report = DirectoryUploadReport::default();

        tracing::info!(dir = %dir.display(), files = files.len(), "Uploading directory");

        for path in files {
            let fingerprint = fingerprint(&path).await?;
            if let Some(uuid) = self.state.uploaded_uuid(&fingerprint).await? {
                tracing::info!(path = %path.display(), uuid = %uuid, "Already uploaded, skipping");
                report.skipped.push((path, uuid));
                continue;
            }

            // Overrides apply per file; a shared name would collide
            let file_options = UploadOptions {
                name: None,
                description: None,
                published_at: None,
                ..options.clone()
            };
            report.uploaded.push(
                self.upload_fingerprinted(&path, fingerprint, &file_options)
                    .await?,
            );
        }

        Ok(report)
    }

    async fn upload_params(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> SyncResult<VideoUploadParams> {
        let mut name = options.name.clone();
        let mut description = options.description.clone();
        let mut published_at = options.published_at;

        if options.use_metadata {
            if let Some(probe) = &self.probe {
                let metadata = probe.probe(path).await?;
                name = name.or(metadata.title);
                description = description.or(metadata.description);
                published_at = published_at.or(metadata.creation_time);
            }
        }

        let name = match name {
            Some(name) => name,
            None => file_name(path)?,
        };

        let mut params = VideoUploadParams::new(path, self.channel_id, name);
        params.description = description;
        params.originally_published_at = published_at;
        params.privacy = options.privacy;
        Ok(params)
    }
}

/// Copy `path` to the backup bucket as the original of `uuid`.
///
/// Needs nothing but the store: this is how an original is recovered for a
/// video that is already on PeerTube.
pub async fn upload_backup<B>(backups: &B, path: &Path, uuid: &str) -> SyncResult<String>
where
    B: BackupStore + ?Sized,
{
    let key = backup_key(uuid, path);
    let content_type = content_type_for(path);

    if backups.exists(&key).await? {
        tracing::warn!(bucket = %backups.bucket(), key = %key, "Replacing existing original");
    }

    backups.upload_file(&key, path, content_type).await?;

    tracing::info!(
        path = %path.display(),
        bucket = %backups.bucket(),
        key = %key,
        "Original backed up"
    );

    Ok(key)
}

fn file_name(path: &Path) -> SyncResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| SyncError::InvalidInput(format!("No file name in {}", path.display())))
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Content type sent with the backup copy.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mpg" | "mpeg" => "video/mpeg",
        "ogv" => "video/ogg",
        "flv" => "video/x-flv",
        "wmv" => "video/x-ms-wmv",
        "3gp" => "video/3gpp",
        _ => "application/octet-stream",
    }
}

/// Regular video files directly inside `dir`, sorted by name.
pub async fn video_files(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SyncError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SyncError::io(dir, e))?
    {
        let path = entry.path();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| SyncError::io(&path, e))?;
        if metadata.is_file() && is_video_file(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
