use crate::{BackupStore, S3Storage, StorageResult};
use std::sync::Arc;
use tube_core::Config;

/// Create the backup store described by the configuration
pub fn create_backup_store(config: &Config) -> StorageResult<Arc<dyn BackupStore>> {
    let storage = S3Storage::new(&config.backup)?;

    tracing::debug!(
        bucket = %config.backup.bucket,
        endpoint = %config.backup.endpoint,
        region = %config.backup.region,
        "Backup store configured"
    );

    Ok(Arc::new(storage))
}
