//! Backup key generation and parsing.
//!
//! Key format: `originals/<uuid><ext>`, where `<uuid>` is the 36-character
//! PeerTube identifier and `<ext>` the source file's extension with its dot.

use std::path::Path;

use tube_core::constants::{BACKUP_KEY_PREFIX, UUID_TEXT_LEN};
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Build the backup key for a file uploaded to PeerTube as `uuid`.
pub fn backup_key(uuid: &str, path: &Path) -> String {
    format!("{}{}{}", BACKUP_KEY_PREFIX, uuid, extension_with_dot(path))
}

/// Extension of `path` including the leading dot, or an empty string.
pub fn extension_with_dot(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Extract the UUID from a backup key.
///
/// The key must start with `originals/`; the UUID is the fixed-width slice that
/// follows it. The extension is not inspected. Anything else is an error: a
/// positional parse of a key that breaks the convention would yield garbage.
pub fn parse_backup_key(key: &str) -> StorageResult<&str> {
    let malformed = |reason| StorageError::MalformedBackupKey {
        key: key.to_string(),
        reason,
    };

    let rest = key
        .strip_prefix(BACKUP_KEY_PREFIX)
        .ok_or_else(|| malformed("missing 'originals/' prefix"))?;

    let uuid = rest
        .get(..UUID_TEXT_LEN)
        .ok_or_else(|| malformed("too short to hold a UUID"))?;

    Uuid::try_parse(uuid).map_err(|_| malformed("not a hyphenated UUID"))?;

    Ok(uuid)
}
