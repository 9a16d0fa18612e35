//! Application-wide constants.

/// Number of leading bytes hashed into a file fingerprint (1 MiB).
pub const FINGERPRINT_PREFIX_BYTES: u64 = 1_048_576;

/// Prefix passed to the backup bucket listing.
pub const BACKUP_PREFIX: &str = "originals";

/// Literal prefix every backup object key starts with.
pub const BACKUP_KEY_PREFIX: &str = "originals/";

/// Length of the canonical hyphenated UUID text form.
pub const UUID_TEXT_LEN: usize = 36;

/// PeerTube caps `count` at 100 for channel listings.
pub const DEFAULT_VIDEO_PAGE_SIZE: usize = 100;

/// S3 returns at most 1000 keys per ListObjectsV2 page.
pub const DEFAULT_BACKUP_PAGE_SIZE: i32 = 1000;

/// File extensions picked up when uploading a directory.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "webm", "avi", "mpg", "mpeg", "ogv", "flv", "wmv", "3gp",
];
