use crate::keys::extension_with_dot;
use crate::traits::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tube_core::VideoFingerprint;

const CREATED_DIR: &str = "created";
const UPLOADED_DIR: &str = "uploaded";

/// Local bookkeeping directory
///
/// Layout:
/// - `created/<fingerprint><ext>`: symlink to the file that was uploaded
/// - `uploaded/<fingerprint>`: sentinel holding the PeerTube UUID it received
///
/// The sentinel is advisory. A crash between the remote upload and writing it
/// leaves an upload with no local record; the backup reconciliation catches
/// the consequences of that.
#[derive(Clone, Debug)]
pub struct LocalState {
    base_path: PathBuf,
}

impl LocalState {
    /// Open (and create if needed) the state tree rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        for dir in [CREATED_DIR, UPLOADED_DIR] {
            let path = base_path.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create state directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(LocalState { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn created_path(&self, fingerprint: &VideoFingerprint, source: &Path) -> PathBuf {
        self.base_path.join(CREATED_DIR).join(format!(
            "{}{}",
            fingerprint,
            extension_with_dot(source)
        ))
    }

    fn uploaded_path(&self, fingerprint: &VideoFingerprint) -> PathBuf {
        self.base_path.join(UPLOADED_DIR).join(fingerprint.as_str())
    }

    /// Link `created/<fingerprint><ext>` to the canonical path of `source`.
    ///
    /// An existing link is replaced, so re-running after a failed upload
    /// points at the latest location of the file.
    pub async fn record_created(
        &self,
        fingerprint: &VideoFingerprint,
        source: &Path,
    ) -> StorageResult<PathBuf> {
        let target = fs::canonicalize(source).await?;
        let link = self.created_path(fingerprint, source);

        if fs::symlink_metadata(&link).await.is_ok() {
            fs::remove_file(&link).await?;
        }

        create_symlink(&target, &link).await?;

        tracing::debug!(
            link = %link.display(),
            target = %target.display(),
            "Recorded created file"
        );

        Ok(link)
    }

    /// Write the `uploaded/<fingerprint>` sentinel holding `uuid`.
    pub async fn record_uploaded(
        &self,
        fingerprint: &VideoFingerprint,
        uuid: &str,
    ) -> StorageResult<()> {
        let path = self.uploaded_path(fingerprint);
        fs::write(&path, uuid).await?;

        tracing::debug!(fingerprint = %fingerprint, uuid = %uuid, "Recorded upload");
        Ok(())
    }

    /// UUID recorded for `fingerprint`, if the file was uploaded before.
    pub async fn uploaded_uuid(&self, fingerprint: &VideoFingerprint) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.uploaded_path(fingerprint)).await {
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    pub async fn is_uploaded(&self, fingerprint: &VideoFingerprint) -> StorageResult<bool> {
        Ok(self.uploaded_uuid(fingerprint).await?.is_some())
    }
}

#[cfg(unix)]
async fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    fs::symlink(target, link).await
}

#[cfg(windows)]
async fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    fs::symlink_file(target, link).await
}
