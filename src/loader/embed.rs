//! Embed URL construction.

use url::form_urlencoded;

use crate::config::EmbedConfig;
use crate::relay::LoadTarget;

/// Builds relay and fallback embed URLs from configuration.
#[derive(Debug, Clone)]
pub struct EmbedUrls {
    scheme: String,
    autoplay: bool,
    quality: Option<String>,
    fallback_base: String,
}

impl EmbedUrls {
    pub fn new(scheme: &str, config: &EmbedConfig) -> Self {
        Self {
            scheme: scheme.to_string(),
            autoplay: config.autoplay,
            quality: config.quality.clone(),
            fallback_base: config.fallback_base.trim_end_matches('/').to_string(),
        }
    }

    /// `{scheme}://{host}/embed/{video}[?playlist=..][&quality=..][&autoplay=1]`
    pub fn relay(&self, host: &str, video_id: &str, playlist_id: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(playlist_id) = playlist_id {
            query.append_pair("playlist", playlist_id);
        }
        if let Some(quality) = &self.quality {
            query.append_pair("quality", quality);
        }
        if self.autoplay {
            query.append_pair("autoplay", "1");
        }
        with_query(format!("{}://{}/embed/{}", self.scheme, host, video_id), query.finish())
    }

    /// Original provider embed for `target`.
    ///
    /// `video_id` overrides the target's own video, e.g. the first entry of a
    /// playlist that was fetched before the embed failed. Returns `None` for
    /// an invalid target.
    pub fn fallback(&self, target: &LoadTarget, video_id: Option<&str>) -> Option<String> {
        let base = &self.fallback_base;
        match (target, video_id) {
            (LoadTarget::Invalid, _) => None,
            (LoadTarget::Video { video_id: own }, video_id) => {
                Some(format!("{}/embed/{}", base, video_id.unwrap_or(own.as_str())))
            }
            (LoadTarget::Playlist { playlist_id }, Some(video_id)) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("list", playlist_id)
                    .finish();
                Some(with_query(format!("{}/embed/{}", base, video_id), query))
            }
            (LoadTarget::Playlist { playlist_id }, None) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("list", playlist_id)
                    .finish();
                Some(with_query(format!("{}/embed/videoseries", base), query))
            }
        }
    }
}

fn with_query(mut url: String, query: String) -> String {
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}
