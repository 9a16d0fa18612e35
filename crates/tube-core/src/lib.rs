//! tube-tools core library
//!
//! Configuration, domain models, constants and the configuration error type
//! shared by the storage, client, sync and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BackupConfig, Config, PeerTubeConfig};
pub use error::ConfigError;
pub use models::{BackupObjectRecord, RemoteVideoRecord, VideoChannel, VideoFingerprint, VideoPrivacy};
