//! Content fingerprint of a local file.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tube_core::constants::FINGERPRINT_PREFIX_BYTES;
use tube_core::VideoFingerprint;

use crate::error::{SyncError, SyncResult};

const READ_CHUNK: usize = 64 * 1024;

/// SHA-256 of the first MiB of `path` (the whole file when shorter).
///
/// Reads in fixed-size chunks, so multi-gigabyte files cost at most 1 MiB of
/// I/O. Name, location and file metadata do not enter the digest.
pub async fn fingerprint(path: &Path) -> SyncResult<VideoFingerprint> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| SyncError::io(path, e))?;
    let mut reader = file.take(FINGERPRINT_PREFIX_BYTES);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK];

    loop {
        let read = reader
            .read(&mut buffer)
            .await
            .map_err(|e| SyncError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(VideoFingerprint::from_digest(&hasher.finalize()))
}
