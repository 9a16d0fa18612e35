//! Backup store abstraction
//!
//! This module defines the BackupStore trait implemented by the S3 backend and
//! by the in-memory fakes used in tests.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tube_core::BackupObjectRecord;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Malformed backup key '{key}': {reason}")]
    MalformedBackupKey { key: String, reason: &'static str },

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One page of a cursor-paginated bucket listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub objects: Vec<BackupObjectRecord>,
    /// More pages follow when true.
    pub is_truncated: bool,
    /// Opaque token to present on the next request.
    pub next_continuation_token: Option<String>,
}

/// Backup store abstraction trait
///
/// The reconciler only needs `list_page`; uploads go through `upload_file`,
/// which must stream from disk since originals can be several gigabytes.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Fetch one page of keys under `prefix`.
    ///
    /// Pass the previous page's `next_continuation_token` to continue; `None`
    /// starts from the beginning.
    async fn list_page(
        &self,
        prefix: &str,
        max_keys: i32,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage>;

    /// Upload a local file to `key`.
    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Bucket name, for logging.
    fn bucket(&self) -> &str;
}
