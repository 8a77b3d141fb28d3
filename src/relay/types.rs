//! Relay payload types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading content through the relay pool.
///
/// Only `InvalidInput` and `AllInstancesFailed` leave the loader; the other
/// variants describe a single attempt and are converted into rotation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// The supplied URL is not a recognizable video or playlist reference.
    #[error("not a recognizable video or playlist URL: {0}")]
    InvalidInput(String),

    /// Network error, non-2xx status or timeout talking to an instance.
    #[error("instance {host} unreachable: {reason}")]
    InstanceUnreachable { host: String, reason: String },

    /// The instance answered but the payload failed shape validation.
    #[error("instance {host} returned a malformed payload: {reason}")]
    MalformedPayload { host: String, reason: String },

    /// Every instance in the pool was attempted without success.
    #[error("all {attempts} relay instances failed")]
    AllInstancesFailed { attempts: usize },

    /// The display surface did not confirm the embed page in time.
    #[error("embed on {host} did not load: {reason}")]
    EmbedDisplayFailure { host: String, reason: String },
}

impl RelayError {
    pub fn unreachable(host: &str, reason: impl ToString) -> Self {
        Self::InstanceUnreachable {
            host: host.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(host: &str, reason: impl ToString) -> Self {
        Self::MalformedPayload {
            host: host.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InstanceUnreachable { .. } => "unreachable",
            Self::MalformedPayload { .. } => "malformed",
            Self::AllInstancesFailed { .. } => "all_failed",
            Self::EmbedDisplayFailure { .. } => "embed_failure",
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// `GET /api/v1/videos/{id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub length_seconds: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub published: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /api/v1/playlists/{id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub videos: Vec<PlaylistEntry>,
}

/// One video of a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub length_seconds: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
}

impl PlaylistEntry {
    /// Duration as `m:ss` or `h:mm:ss`.
    pub fn duration_label(&self) -> Option<String> {
        self.length_seconds.map(format_duration)
    }
}

/// Content returned by a successful relay call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayData {
    Video(VideoDetails),
    Playlist(PlaylistDetails),
}

impl RelayData {
    /// Video that should start playing.
    pub fn first_video_id(&self) -> Option<&str> {
        match self {
            RelayData::Video(video) => Some(video.video_id.as_str()).filter(|id| !id.is_empty()),
            RelayData::Playlist(playlist) => playlist.videos.first().map(|v| v.video_id.as_str()),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            RelayData::Video(video) => &video.title,
            RelayData::Playlist(playlist) => &playlist.title,
        }
    }
}

impl VideoDetails {
    /// A video payload must carry a title.
    pub fn validate(self, host: &str) -> RelayResult<Self> {
        if self.title.trim().is_empty() {
            return Err(RelayError::malformed(host, "video has no title"));
        }
        Ok(self)
    }
}

impl PlaylistDetails {
    /// A playlist payload must list at least one video.
    pub fn validate(self, host: &str) -> RelayResult<Self> {
        if self.videos.is_empty() {
            return Err(RelayError::malformed(host, "playlist has no videos"));
        }
        if self.videos.iter().any(|v| v.video_id.is_empty()) {
            return Err(RelayError::malformed(host, "playlist entry without videoId"));
        }
        Ok(self)
    }
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_payload_deserializes_camel_case() {
        let video: VideoDetails = serde_json::from_str(
            r#"{"title":"Hello","videoId":"abc123","lengthSeconds":61,"viewCount":10,"author":"someone"}"#,
        )
        .unwrap();
        assert_eq!(video.video_id, "abc123");
        assert_eq!(video.length_seconds, Some(61));
        assert!(video.validate("h").is_ok());
    }

    #[test]
    fn test_untitled_video_is_malformed() {
        let video: VideoDetails = serde_json::from_str(r#"{"videoId":"abc123"}"#).unwrap();
        let err = video.validate("h").unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn test_empty_playlist_is_malformed() {
        let playlist: PlaylistDetails = serde_json::from_str(r#"{"title":"P","videos":[]}"#).unwrap();
        assert!(matches!(
            playlist.validate("h"),
            Err(RelayError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_first_video_of_playlist() {
        let playlist: PlaylistDetails = serde_json::from_str(
            r#"{"title":"P","videos":[{"videoId":"v1","title":"One"},{"videoId":"v2","title":"Two"}]}"#,
        )
        .unwrap();
        let data = RelayData::Playlist(playlist.validate("h").unwrap());
        assert_eq!(data.first_video_id(), Some("v1"));
        assert_eq!(data.title(), "P");
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(61), "1:01");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn test_error_display() {
        let err = RelayError::AllInstancesFailed { attempts: 3 };
        assert_eq!(err.to_string(), "all 3 relay instances failed");

        let err = RelayError::unreachable("yewtu.be", "timeout");
        assert!(err.to_string().contains("yewtu.be"));
    }
}
