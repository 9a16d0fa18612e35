//! Cross-check between PeerTube and the backup bucket.
//!
//! Local sentinels only record what this machine believes it uploaded. The
//! reconciler asks both remotes instead and reports the videos whose original
//! never made it to the bucket.

use futures::future;
use futures::stream::TryStreamExt;
use std::collections::HashSet;
use std::time::Instant;
use tube_core::constants::{BACKUP_PREFIX, DEFAULT_BACKUP_PAGE_SIZE, DEFAULT_VIDEO_PAGE_SIZE};
use tube_storage::{parse_backup_key, BackupStore};

use crate::catalog::{backup_catalog, video_catalog, VideoPageSource};
use crate::error::{SyncError, SyncResult};

/// UUIDs published on PeerTube with no original in the backup bucket.
pub type ReconciliationResult = HashSet<String>;

/// Paging parameters of a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub video_page_size: usize,
    pub backup_prefix: String,
    pub backup_page_size: i32,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            video_page_size: DEFAULT_VIDEO_PAGE_SIZE,
            backup_prefix: BACKUP_PREFIX.to_string(),
            backup_page_size: DEFAULT_BACKUP_PAGE_SIZE,
        }
    }
}

/// Compute the videos missing a backup copy.
///
/// Both catalogs are drained completely before diffing. They are read-only
/// and independent, so they are drained concurrently; the first error aborts
/// the whole run. A backup key that breaks the `originals/<uuid><ext>`
/// convention is fatal rather than skipped.
pub async fn compute_missing_backups<V, B>(
    videos: &V,
    backups: &B,
    options: &ReconcileOptions,
) -> SyncResult<ReconciliationResult>
where
    V: VideoPageSource + ?Sized,
    B: BackupStore + ?Sized,
{
    let start = Instant::now();

    let (video_uuids, backup_uuids) = tokio::try_join!(
        collect_video_uuids(videos, options.video_page_size),
        collect_backup_uuids(backups, &options.backup_prefix, options.backup_page_size),
    )?;

    let missing = missing_backups(&video_uuids, &backup_uuids);

    tracing::info!(
        videos = video_uuids.len(),
        backups = backup_uuids.len(),
        missing = missing.len(),
        bucket = %backups.bucket(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Reconciliation complete"
    );

    Ok(missing)
}

/// UUIDs of every video in the catalog, verbatim.
pub async fn collect_video_uuids<V>(videos: &V, page_size: usize) -> SyncResult<HashSet<String>>
where
    V: VideoPageSource + ?Sized,
{
    video_catalog(videos, page_size)
        .map_ok(|video| video.uuid)
        .try_collect()
        .await
}

/// UUIDs parsed out of every backup key under `prefix`.
pub async fn collect_backup_uuids<B>(
    backups: &B,
    prefix: &str,
    page_size: i32,
) -> SyncResult<HashSet<String>>
where
    B: BackupStore + ?Sized,
{
    backup_catalog(backups, prefix, page_size)
        .and_then(|object| {
            future::ready(
                parse_backup_key(&object.key)
                    .map(str::to_string)
                    .map_err(SyncError::from),
            )
        })
        .try_collect()
        .await
}

/// Set difference `videos - backups`.
pub fn missing_backups(
    videos: &HashSet<String>,
    backups: &HashSet<String>,
) -> ReconciliationResult {
    videos.difference(backups).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{uuid_n, MockBackupStore, MockVideoSource};
    use tube_storage::StorageError;

    fn set(items: &[String]) -> HashSet<String> {
        items.iter().cloned().collect()
    }

    fn backup_keys(uuids: &[String]) -> Vec<String> {
        uuids.iter().map(|u| format!("originals/{}.mp4", u)).collect()
    }

    #[test]
    fn test_set_difference() {
        let (a, b, c) = (uuid_n(1), uuid_n(2), uuid_n(3));
        let missing = missing_backups(
            &set(&[a.clone(), b.clone(), c.clone()]),
            &set(&[b.clone()]),
        );
        assert_eq!(missing, set(&[a, c]));
    }

    #[tokio::test]
    async fn test_reports_videos_without_backup() {
        let (a, b, c) = (uuid_n(1), uuid_n(2), uuid_n(3));
        let videos = MockVideoSource::new(vec![a.clone(), b.clone(), c.clone()]);
        let backups = MockBackupStore::with_keys(backup_keys(&[b]));

        let missing = compute_missing_backups(&videos, &backups, &ReconcileOptions::default())
            .await
            .unwrap();

        assert_eq!(missing, set(&[a, c]));
    }

    #[tokio::test]
    async fn test_empty_channel_yields_empty_result() {
        let videos = MockVideoSource::new(Vec::new());
        let backups = MockBackupStore::with_keys(backup_keys(&[uuid_n(1), uuid_n(2)]));

        let missing = compute_missing_backups(&videos, &backups, &ReconcileOptions::default())
            .await
            .unwrap();

        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_full_coverage_yields_empty_result() {
        let uuids: Vec<String> = (0..25).map(uuid_n).collect();
        let videos = MockVideoSource::new(uuids.clone());
        let backups = MockBackupStore::with_keys(backup_keys(&uuids));
        let options = ReconcileOptions {
            video_page_size: 4,
            backup_page_size: 7,
            ..ReconcileOptions::default()
        };

        let missing = compute_missing_backups(&videos, &backups, &options)
            .await
            .unwrap();

        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_extra_backups_are_ignored() {
        let a = uuid_n(1);
        let videos = MockVideoSource::new(vec![a.clone()]);
        let backups = MockBackupStore::with_keys(backup_keys(&[a, uuid_n(99)]));

        let missing = compute_missing_backups(&videos, &backups, &ReconcileOptions::default())
            .await
            .unwrap();

        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_key_aborts() {
        let videos = MockVideoSource::new(vec![uuid_n(1)]);
        let backups = MockBackupStore::with_keys(vec![
            format!("originals/{}.mp4", uuid_n(1)),
            "originals/not-a-uuid.mp4".to_string(),
        ]);

        let result =
            compute_missing_backups(&videos, &backups, &ReconcileOptions::default()).await;

        assert!(matches!(
            result,
            Err(SyncError::Storage(StorageError::MalformedBackupKey { .. }))
        ));
    }

    #[tokio::test]
    async fn test_key_outside_convention_under_listing_prefix_aborts() {
        // "originals" as a listing prefix also matches "originals-old/..."
        let videos = MockVideoSource::new(vec![uuid_n(1)]);
        let backups =
            MockBackupStore::with_keys(vec![format!("originals-old/{}.mp4", uuid_n(1))]);

        let result =
            compute_missing_backups(&videos, &backups, &ReconcileOptions::default()).await;

        assert!(matches!(
            result,
            Err(SyncError::Storage(StorageError::MalformedBackupKey { .. }))
        ));
    }

    #[tokio::test]
    async fn test_catalog_error_aborts() {
        let videos = MockVideoSource::new((0..5).map(uuid_n).collect()).failing_at(0);
        let backups = MockBackupStore::new();

        let result =
            compute_missing_backups(&videos, &backups, &ReconcileOptions::default()).await;

        assert!(result.is_err());
    }
}
