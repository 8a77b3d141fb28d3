//! User-supplied URL → load target.
//!
//! # Accepted forms
//! - `https://youtu.be/{video}`
//! - `https://www.youtube.com/watch?v={video}`
//! - `https://www.youtube.com/playlist?list={playlist}`
//! - `https://www.youtube.com/shorts/{video}`, `/embed/{video}`, `/live/{video}`
//!
//! # Design Decisions
//! - Host matching is case-insensitive and limited to youtube.com and its subdomains
//! - A `list` parameter wins over a `v` parameter
//! - IDs are restricted to the URL-safe base64 alphabet

use serde::Serialize;
use url::Url;

/// What the user asked to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadTarget {
    Video { video_id: String },
    Playlist { playlist_id: String },
    Invalid,
}

impl LoadTarget {
    /// Parse a pasted URL. Never fails; unrecognized input yields `Invalid`.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                match Url::parse(&format!("https://{}", input)) {
                    Ok(url) => url,
                    Err(_) => return LoadTarget::Invalid,
                }
            }
            Err(_) => return LoadTarget::Invalid,
        };

        if !matches!(url.scheme(), "http" | "https") {
            return LoadTarget::Invalid;
        }

        let host = match url.host_str() {
            Some(h) => h.to_ascii_lowercase(),
            None => return LoadTarget::Invalid,
        };

        let query = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .filter(|v| is_valid_id(v))
        };

        let short_link = host == "youtu.be";
        if !short_link && !is_youtube_host(&host) {
            return LoadTarget::Invalid;
        }

        if let Some(playlist_id) = query("list") {
            return LoadTarget::Playlist { playlist_id };
        }

        let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

        if short_link {
            return match segments.next() {
                Some(id) if is_valid_id(id) => LoadTarget::Video {
                    video_id: id.to_string(),
                },
                _ => LoadTarget::Invalid,
            };
        }

        if let Some(video_id) = query("v") {
            return LoadTarget::Video { video_id };
        }

        match (segments.next(), segments.next()) {
            (Some("shorts" | "embed" | "live"), Some(id)) if is_valid_id(id) => LoadTarget::Video {
                video_id: id.to_string(),
            },
            _ => LoadTarget::Invalid,
        }
    }

    /// True for a video or playlist whose id is safe to put in a URL path.
    pub fn is_valid(&self) -> bool {
        self.id().is_some_and(is_valid_id)
    }

    /// The identifier being loaded, for logging.
    pub fn id(&self) -> Option<&str> {
        match self {
            LoadTarget::Video { video_id } => Some(video_id),
            LoadTarget::Playlist { playlist_id } => Some(playlist_id),
            LoadTarget::Invalid => None,
        }
    }
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com")
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
