use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Lowercase hex SHA-256 digest of the first MiB of a file.
///
/// Depends on the content prefix only. Used as the local cache key; never
/// sent to a remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoFingerprint(String);

impl VideoFingerprint {
    /// Wrap a raw digest, normalising it to lowercase hex.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VideoFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex() {
        let fp = VideoFingerprint::from_digest(&[0xAB, 0x01, 0xFF]);
        assert_eq!(fp.as_str(), "ab01ff");
        assert_eq!(fp.to_string(), "ab01ff");
    }
}
