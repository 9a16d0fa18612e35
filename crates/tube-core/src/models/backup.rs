use serde::{Deserialize, Serialize};

/// One object listed under the backup prefix.
///
/// Keys look like `originals/<uuid><ext>`; parsing lives in `tube-storage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupObjectRecord {
    pub key: String,
    pub size: Option<i64>,
}

impl BackupObjectRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }
}
