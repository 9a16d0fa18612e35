use crate::traits::{BackupStore, ListPage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use std::path::Path;
use tube_core::{BackupConfig, BackupObjectRecord};

/// Files above this size go through a multipart upload.
const MULTIPART_THRESHOLD: u64 = 64 * 1024 * 1024;
/// Part size for multipart uploads (S3 minimum is 5 MiB except for the last part).
const PART_SIZE: u64 = 64 * 1024 * 1024;

/// S3 backup bucket implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage for an S3-compatible endpoint (MinIO, Garage, B2, ...).
    ///
    /// Credentials come from the configuration, not the ambient AWS chain, and
    /// the SDK's own retries are disabled: a failed call fails the command.
    pub fn new(config: &BackupConfig) -> StorageResult<Self> {
        if config.bucket.is_empty() {
            return Err(StorageError::ConfigError(
                "S3_BUCKET not configured".to_string(),
            ));
        }

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "tube-tools-env",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            // Path-style addressing is required by most S3-compatible providers
            .force_path_style(true)
            .build();

        Ok(Self::from_client(
            Client::from_conf(s3_config),
            config.bucket.clone(),
        ))
    }

    pub fn from_client(client: Client, bucket: String) -> Self {
        S3Storage { client, bucket }
    }

    async fn put_single(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to open {}: {}", path.display(), e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        Ok(())
    }

    async fn put_multipart(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        size: u64,
    ) -> StorageResult<u64> {
        let create_result = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "Failed to create multipart upload"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let upload_id = create_result
            .upload_id()
            .ok_or_else(|| StorageError::UploadFailed("No upload ID returned from S3".to_string()))?
            .to_string();

        match self.upload_parts(key, path, &upload_id, size).await {
            Ok(parts) => {
                let part_count = parts.len() as u64;
                let completed = CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build();

                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(completed)
                    .send()
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            error = %e,
                            bucket = %self.bucket,
                            key = %key,
                            "Failed to complete multipart upload"
                        );
                        StorageError::UploadFailed(e.to_string())
                    })?;

                Ok(part_count)
            }
            Err(e) => {
                // Abort so the bucket does not keep billing for orphaned parts
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %key,
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        key: &str,
        path: &Path,
        upload_id: &str,
        size: u64,
    ) -> StorageResult<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut offset = 0u64;
        let mut part_number = 1i32;

        while offset < size {
            let length = PART_SIZE.min(size - offset);
            let body = ByteStream::read_from()
                .path(path)
                .offset(offset)
                .length(Length::Exact(length))
                .build()
                .await
                .map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to read part {} of {}: {}",
                        part_number,
                        path.display(),
                        e
                    ))
                })?;

            let result = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %key,
                        part_number = part_number,
                        "Failed to upload part"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;

            let etag = result.e_tag().ok_or_else(|| {
                StorageError::UploadFailed(format!("No ETag returned for part {}", part_number))
            })?;

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(etag)
                    .build(),
            );

            offset += length;
            part_number += 1;
        }

        Ok(parts)
    }
}

#[async_trait]
impl BackupStore for S3Storage {
    async fn list_page(
        &self,
        prefix: &str,
        max_keys: i32,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage> {
        let start = std::time::Instant::now();

        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .set_continuation_token(continuation_token.map(String::from))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 list failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;

        let objects: Vec<BackupObjectRecord> = output
            .contents()
            .iter()
            .filter_map(|obj| {
                obj.key().map(|key| BackupObjectRecord {
                    key: key.to_string(),
                    size: obj.size(),
                })
            })
            .collect();

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list page fetched"
        );

        Ok(ListPage {
            objects,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(String::from),
        })
    }

    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let size = tokio::fs::metadata(path).await?.len();

        if size > MULTIPART_THRESHOLD {
            let parts = self.put_multipart(key, path, content_type, size).await?;
            tracing::info!(
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                parts = parts,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 multipart upload successful"
            );
        } else {
            self.put_single(key, path, content_type).await?;
            tracing::info!(
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload successful"
            );
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(err)) if matches!(err.err(), HeadObjectError::NotFound(_)) => {
                Ok(false)
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
