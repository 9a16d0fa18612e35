//! Synchronisation between local video files, a PeerTube channel and the
//! S3 bucket holding the originals.
//!
//! - [`fingerprint`]: content identity of local files
//! - [`catalog`]: paginated enumeration of both remotes
//! - [`reconcile`]: videos published without a backup copy
//! - [`upload`]: PeerTube upload plus backup copy, with local bookkeeping
//! - [`metadata`]: ffprobe-based metadata of local files
//! - [`listing`]: Markdown README of a channel

pub mod catalog;
pub mod error;
pub mod fingerprint;
pub mod listing;
pub mod metadata;
pub mod reconcile;
pub mod upload;

#[cfg(test)]
pub mod test_helpers;

pub use catalog::{backup_catalog, video_catalog, ChannelVideoSource, VideoPageSource};
pub use error::{SyncError, SyncResult};
pub use fingerprint::fingerprint;
pub use listing::{render_channel_readme, DescriptionSource, ListingOptions};
pub use metadata::{VideoMetadata, VideoProbe};
pub use reconcile::{compute_missing_backups, missing_backups, ReconcileOptions, ReconciliationResult};
pub use upload::{
    upload_backup, DirectoryUploadReport, UploadOptions, UploadOutcome, Uploader, VideoPublisher,
};
