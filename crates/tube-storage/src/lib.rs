//! tube-tools storage library
//!
//! Backup bucket access and the local bookkeeping directory.
//!
//! # Backup key format
//!
//! Every original is stored as `originals/<uuid><ext>`, `<uuid>` being the
//! identifier PeerTube assigned to the upload. Key generation and parsing are
//! centralized in the `keys` module; reconciliation depends on the parse being
//! exact.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_backup_store;
pub use keys::{backup_key, parse_backup_key};
pub use local::LocalState;
pub use s3::S3Storage;
pub use traits::{BackupStore, ListPage, StorageError, StorageResult};
