//! Data models for the application
//!
//! Records coming from the two remote catalogs and the local fingerprint type.

mod backup;
mod fingerprint;
mod video;

pub use backup::BackupObjectRecord;
pub use fingerprint::VideoFingerprint;
pub use video::{RemoteVideoRecord, VideoChannel, VideoPrivacy};
