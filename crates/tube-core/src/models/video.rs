use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// One video as listed by `GET /api/v1/video-channels/{channel}/videos`.
///
/// Only `uuid` is needed for reconciliation; the rest feeds the channel listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVideoRecord {
    pub uuid: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "shortUUID")]
    pub short_uuid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl RemoteVideoRecord {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            id: None,
            short_uuid: None,
            name: String::new(),
            url: None,
            thumbnail_path: None,
            published_at: None,
        }
    }
}

/// Channel as returned by `GET /api/v1/video-channels/{channel}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoChannel {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// PeerTube privacy levels, sent as their numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoPrivacy {
    #[default]
    Public,
    Unlisted,
    Private,
    Internal,
}

impl VideoPrivacy {
    pub fn id(self) -> u8 {
        match self {
            VideoPrivacy::Public => 1,
            VideoPrivacy::Unlisted => 2,
            VideoPrivacy::Private => 3,
            VideoPrivacy::Internal => 4,
        }
    }
}

impl Display for VideoPrivacy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.id())
    }
}

impl FromStr for VideoPrivacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "public" => Ok(VideoPrivacy::Public),
            "2" | "unlisted" => Ok(VideoPrivacy::Unlisted),
            "3" | "private" => Ok(VideoPrivacy::Private),
            "4" | "internal" => Ok(VideoPrivacy::Internal),
            _ => Err(format!("Invalid privacy level: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_video() {
        let video: RemoteVideoRecord =
            serde_json::from_str(r#"{"uuid":"9c9de5e8-0a1e-484a-b099-e80766180a6d"}"#).unwrap();
        assert_eq!(video.uuid, "9c9de5e8-0a1e-484a-b099-e80766180a6d");
        assert_eq!(video.name, "");
        assert!(video.published_at.is_none());
    }

    #[test]
    fn deserializes_listing_fields() {
        let json = r#"{
            "id": 42,
            "uuid": "9c9de5e8-0a1e-484a-b099-e80766180a6d",
            "shortUUID": "kkGMgK9ZtnKfYAgnEtQxbv",
            "name": "Demo",
            "url": "https://tube.example.org/w/kkGMgK9ZtnKfYAgnEtQxbv",
            "thumbnailPath": "/lazy-static/thumbnails/a.jpg",
            "publishedAt": "2023-05-01T10:00:00.000Z",
            "views": 12
        }"#;
        let video: RemoteVideoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(video.id, Some(42));
        assert_eq!(video.short_uuid.as_deref(), Some("kkGMgK9ZtnKfYAgnEtQxbv"));
        assert_eq!(
            video.thumbnail_path.as_deref(),
            Some("/lazy-static/thumbnails/a.jpg")
        );
        assert!(video.published_at.is_some());
    }

    #[test]
    fn privacy_parses_names_and_ids() {
        assert_eq!("public".parse::<VideoPrivacy>(), Ok(VideoPrivacy::Public));
        assert_eq!("3".parse::<VideoPrivacy>(), Ok(VideoPrivacy::Private));
        assert!("secret".parse::<VideoPrivacy>().is_err());
        assert_eq!(VideoPrivacy::Unlisted.to_string(), "2");
    }
}
