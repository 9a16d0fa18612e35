//! Error type for sync operations.
//!
//! Every variant is fatal to the command that produced it; nothing in this
//! crate retries or skips.

use std::path::PathBuf;
use tube_api_client::ApiError;
use tube_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("PeerTube error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata extraction failed: {0}")]
    Metadata(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
