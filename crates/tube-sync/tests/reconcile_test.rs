mod helpers;

use helpers::{PagedVideos, StaticBackups};
use std::collections::HashSet;
use tube_storage::StorageError;
use tube_sync::{compute_missing_backups, ReconcileOptions, SyncError};

const U1: &str = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";
const U2: &str = "6fa459ea-ee8a-3ca4-894e-db77e160355e";
const U3: &str = "886313e1-3b8a-5372-9b90-0c9aee199e5d";

fn options(video_page_size: usize) -> ReconcileOptions {
    ReconcileOptions {
        video_page_size,
        ..ReconcileOptions::default()
    }
}

#[tokio::test]
async fn test_reports_videos_missing_from_bucket_across_pages() {
    let videos = PagedVideos::new(vec![vec![U1, U2], vec![U3]]);
    let backups = StaticBackups::new(vec![format!("originals/{}.mp4", U1)]);

    let missing = compute_missing_backups(&videos, &backups, &options(2))
        .await
        .unwrap();

    let expected: HashSet<String> = [U2, U3].into_iter().map(String::from).collect();
    assert_eq!(missing, expected);
}

#[tokio::test]
async fn test_extension_does_not_matter() {
    let videos = PagedVideos::new(vec![vec![U1, U2]]);
    let backups = StaticBackups::new(vec![
        format!("originals/{}.MOV", U1),
        format!("originals/{}", U2),
    ]);

    let missing = compute_missing_backups(&videos, &backups, &options(10))
        .await
        .unwrap();

    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_keys_outside_prefix_are_not_listed() {
    let videos = PagedVideos::new(vec![vec![U1]]);
    let backups = StaticBackups::new(vec![
        format!("thumbnails/{}.jpg", U1),
        format!("originals/{}.mp4", U2),
    ]);

    let missing = compute_missing_backups(&videos, &backups, &options(10))
        .await
        .unwrap();

    assert_eq!(missing, HashSet::from([U1.to_string()]));
}

#[tokio::test]
async fn test_truncated_key_is_fatal() {
    let videos = PagedVideos::new(vec![vec![U1]]);
    let backups = StaticBackups::new(vec!["originals/1b4e28ba.mp4".to_string()]);

    let result = compute_missing_backups(&videos, &backups, &options(10)).await;

    match result {
        Err(SyncError::Storage(StorageError::MalformedBackupKey { key, .. })) => {
            assert_eq!(key, "originals/1b4e28ba.mp4");
        }
        other => panic!("expected malformed key error, got {:?}", other),
    }
}
