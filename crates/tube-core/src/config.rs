//! Configuration module
//!
//! Configuration is read once at startup and passed explicitly to every
//! component that needs it. Required variables are validated eagerly so a
//! misconfigured run fails before any network activity.

use std::env;
use std::path::PathBuf;

use validator::ValidateUrl;

use crate::error::ConfigError;

const DEFAULT_S3_REGION: &str = "us-east-1";
const DEFAULT_DATA_DIR: &str = ".tube-tools";
/// Used when `FFPROBE_PATH` is unset or blank.
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";

/// PeerTube server settings.
#[derive(Clone, Debug)]
pub struct PeerTubeConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Channel handle, e.g. `my_channel` (used in `/video-channels/{channel}`).
    pub channel: String,
}

/// S3-compatible backup bucket settings.
#[derive(Clone, Debug)]
pub struct BackupConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub peertube: PeerTubeConfig,
    pub backup: BackupConfig,
    /// Root of the local state tree (`created/`, `uploaded/`).
    pub data_dir: PathBuf,
    pub ffprobe_path: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Values are kept verbatim; whitespace only decides blankness.
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        // URLs, handles and names never carry meaningful surrounding whitespace.
        let required_trimmed = |name: &'static str| -> Result<String, ConfigError> {
            required(name).map(|value| value.trim().to_string())
        };
        let optional = |name: &str, default: &str| -> String {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Config {
            peertube: PeerTubeConfig {
                url: required_trimmed("PEERTUBE_URL")?,
                username: required_trimmed("PEERTUBE_USERNAME")?,
                password: required("PEERTUBE_PASSWORD")?,
                channel: required_trimmed("PEERTUBE_CHANNEL_ID")?,
            },
            backup: BackupConfig {
                endpoint: required_trimmed("S3_ENDPOINT")?,
                access_key: required_trimmed("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                bucket: required_trimmed("S3_BUCKET")?,
                region: optional("S3_REGION", DEFAULT_S3_REGION),
            },
            data_dir: PathBuf::from(optional("DATA_DIR", DEFAULT_DATA_DIR)),
            ffprobe_path: optional("FFPROBE_PATH", DEFAULT_FFPROBE_PATH),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.peertube.url.validate_url() {
            return Err(ConfigError::Invalid {
                name: "PEERTUBE_URL",
                reason: format!("'{}' is not a valid URL", self.peertube.url),
            });
        }

        if !self.backup.endpoint.validate_url() {
            return Err(ConfigError::Invalid {
                name: "S3_ENDPOINT",
                reason: format!("'{}' is not a valid URL", self.backup.endpoint),
            });
        }

        if self.peertube.channel.contains('/') {
            return Err(ConfigError::Invalid {
                name: "PEERTUBE_CHANNEL_ID",
                reason: "channel handle must not contain '/'".to_string(),
            });
        }

        Ok(())
    }

    pub fn peertube_url(&self) -> &str {
        self.peertube.url.trim_end_matches('/')
    }
}
