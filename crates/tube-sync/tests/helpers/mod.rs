//! Shared fixtures for tube-sync integration tests.

use async_trait::async_trait;
use std::path::Path;
use tube_core::{BackupObjectRecord, RemoteVideoRecord};
use tube_storage::{BackupStore, ListPage, StorageError, StorageResult};
use tube_sync::{SyncResult, VideoPageSource};

/// Video source serving fixed pages, regardless of the requested offset.
///
/// Asserts the reconciler walks the pages in order with the expected offsets.
pub struct PagedVideos {
    pages: Vec<Vec<String>>,
}

impl PagedVideos {
    pub fn new(pages: Vec<Vec<&str>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(String::from).collect())
                .collect(),
        }
    }
}

#[async_trait]
impl VideoPageSource for PagedVideos {
    async fn fetch_page(&self, start: usize, _count: usize) -> SyncResult<Vec<RemoteVideoRecord>> {
        let mut offset = 0;
        for page in &self.pages {
            if offset == start {
                return Ok(page.iter().cloned().map(RemoteVideoRecord::new).collect());
            }
            offset += page.len();
        }
        assert_eq!(offset, start, "unexpected offset {}", start);
        Ok(Vec::new())
    }
}

/// Single-page, read-only backup listing.
pub struct StaticBackups {
    keys: Vec<String>,
}

impl StaticBackups {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl BackupStore for StaticBackups {
    async fn list_page(
        &self,
        prefix: &str,
        _max_keys: i32,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage> {
        assert!(continuation_token.is_none());
        Ok(ListPage {
            objects: self
                .keys
                .iter()
                .filter(|key| key.starts_with(prefix))
                .map(BackupObjectRecord::new)
                .collect(),
            is_truncated: false,
            next_continuation_token: None,
        })
    }

    async fn upload_file(&self, key: &str, _path: &Path, _content_type: &str) -> StorageResult<()> {
        Err(StorageError::UploadFailed(format!("read-only fixture: {}", key)))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.keys.iter().any(|k| k == key))
    }

    fn bucket(&self) -> &str {
        "fixture-bucket"
    }
}
