//! Test helpers for sync unit tests
//!
//! In-memory implementations of the two catalog seams, recording the requests
//! they receive so tests can assert on pagination.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tube_api_client::VideoUploadParams;
use tube_core::{BackupObjectRecord, RemoteVideoRecord};
use tube_storage::{BackupStore, ListPage, StorageError, StorageResult};

use crate::catalog::VideoPageSource;
use crate::error::{SyncError, SyncResult};
use crate::upload::VideoPublisher;

/// Deterministic, well-formed UUID for index `n`.
pub fn uuid_n(n: usize) -> String {
    format!("00000000-0000-4000-8000-{:012x}", n)
}

/// Offset-paginated video source over a fixed list of UUIDs.
pub struct MockVideoSource {
    videos: Vec<RemoteVideoRecord>,
    fail_at: Option<usize>,
    requests: Mutex<Vec<(usize, usize)>>,
}

impl MockVideoSource {
    pub fn new(uuids: Vec<String>) -> Self {
        Self {
            videos: uuids.into_iter().map(RemoteVideoRecord::new).collect(),
            fail_at: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn from_records(videos: Vec<RemoteVideoRecord>) -> Self {
        Self {
            videos,
            fail_at: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the request whose offset equals `start`.
    pub fn failing_at(mut self, start: usize) -> Self {
        self.fail_at = Some(start);
        self
    }

    pub fn requests(&self) -> Vec<(usize, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoPageSource for MockVideoSource {
    async fn fetch_page(&self, start: usize, count: usize) -> SyncResult<Vec<RemoteVideoRecord>> {
        self.requests.lock().unwrap().push((start, count));

        if self.fail_at == Some(start) {
            return Err(SyncError::InvalidInput(format!(
                "simulated failure at offset {}",
                start
            )));
        }

        Ok(self.videos.iter().skip(start).take(count).cloned().collect())
    }
}

/// Backup store holding keys in memory, paginated with numeric tokens.
pub struct MockBackupStore {
    keys: Mutex<Vec<String>>,
    drop_tokens: bool,
    list_requests: Mutex<Vec<Option<String>>>,
    uploads: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockBackupStore {
    pub fn new() -> Self {
        Self::with_keys(Vec::new())
    }

    pub fn with_keys(keys: Vec<String>) -> Self {
        Self {
            keys: Mutex::new(keys),
            drop_tokens: false,
            list_requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(HashMap::new()),
        }
    }

    /// Report truncation without a continuation token.
    pub fn dropping_tokens(mut self) -> Self {
        self.drop_tokens = true;
        self
    }

    pub fn list_requests(&self) -> Vec<Option<String>> {
        self.list_requests.lock().unwrap().clone()
    }

    /// Data uploaded to `key`, if any.
    pub fn uploaded(&self, key: &str) -> Option<Vec<u8>> {
        self.uploads.lock().unwrap().get(key).cloned()
    }
}

impl Default for MockBackupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackupStore for MockBackupStore {
    async fn list_page(
        &self,
        prefix: &str,
        max_keys: i32,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage> {
        self.list_requests
            .lock()
            .unwrap()
            .push(continuation_token.map(String::from));

        let start: usize = match continuation_token {
            Some(token) => token
                .parse()
                .map_err(|_| StorageError::ListFailed(format!("bad token {}", token)))?,
            None => 0,
        };

        let matching: Vec<String> = self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        let end = (start + max_keys as usize).min(matching.len());
        let objects = matching[start.min(end)..end]
            .iter()
            .map(BackupObjectRecord::new)
            .collect();
        let is_truncated = end < matching.len();

        Ok(ListPage {
            objects,
            is_truncated,
            next_continuation_token: (is_truncated && !self.drop_tokens)
                .then(|| end.to_string()),
        })
    }

    async fn upload_file(&self, key: &str, path: &Path, _content_type: &str) -> StorageResult<()> {
        let data = tokio::fs::read(path).await?;
        self.uploads.lock().unwrap().insert(key.to_string(), data);
        self.keys.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.keys.lock().unwrap().iter().any(|k| k == key))
    }

    fn bucket(&self) -> &str {
        "mock-bucket"
    }
}

/// Publisher assigning sequential UUIDs and recording what it was sent.
pub struct MockPublisher {
    next: AtomicUsize,
    fail_next: AtomicBool,
    published: Mutex<Vec<VideoUploadParams>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(1),
            fail_next: AtomicBool::new(false),
            published: Mutex::new(Vec::new()),
        }
    }

    /// Make the next publish fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Successfully published uploads, in order.
    pub fn published(&self) -> Vec<VideoUploadParams> {
        self.published.lock().unwrap().clone()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoPublisher for MockPublisher {
    async fn publish(&self, params: &VideoUploadParams) -> SyncResult<String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SyncError::InvalidInput("simulated publish failure".to_string()));
        }

        let uuid = uuid_n(self.next.fetch_add(1, Ordering::SeqCst));
        self.published.lock().unwrap().push(params.clone());
        Ok(uuid)
    }
}
