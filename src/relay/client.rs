//! Relay HTTP client.
//!
//! # Responsibilities
//! - Call an instance's YouTube-compatible JSON API
//! - Probe an instance's health endpoint
//! - Classify every failure as unreachable or malformed
//!
//! Timeouts are applied by the callers, which also own the latency clock.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::relay::types::{PlaylistDetails, RelayError, RelayResult, VideoDetails};

/// The operations the failover engine needs from a relay instance.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Fetch video metadata from `host`, as served. Callers validate it.
    async fn video(&self, host: &str, video_id: &str) -> RelayResult<VideoDetails>;

    /// Fetch playlist metadata from `host`.
    async fn playlist(&self, host: &str, playlist_id: &str) -> RelayResult<PlaylistDetails>;

    /// Hit the health endpoint of `host`. Only reachability matters.
    async fn probe(&self, host: &str) -> RelayResult<()>;
}

/// `RelayApi` over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    scheme: String,
    health_path: String,
}

impl HttpRelayClient {
    pub fn new(scheme: &str, health_path: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("relay-failover/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, scheme, health_path))
    }

    pub fn with_client(client: reqwest::Client, scheme: &str, health_path: &str) -> Self {
        Self {
            client,
            scheme: scheme.to_string(),
            health_path: health_path.to_string(),
        }
    }

    fn url(&self, host: &str, path: &str) -> String {
        format!("{}://{}{}", self.scheme, host, path)
    }

    /// `{scheme}://{host}/api/v1/{resource}/{id}` with `id` encoded as a
    /// single path segment.
    fn api_url(&self, host: &str, resource: &str, id: &str) -> RelayResult<Url> {
        let mut url = Url::parse(&self.url(host, "/")).map_err(|e| RelayError::unreachable(host, e))?;
        url.path_segments_mut()
            .map_err(|_| RelayError::unreachable(host, "URL cannot carry a path"))?
            .clear()
            .extend(["api", "v1", resource, id]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, host: &str, url: Url) -> RelayResult<T> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RelayError::unreachable(host, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::unreachable(host, format!("HTTP {}", status)));
        }

        // The body arrived, so anything wrong from here on is the payload's fault.
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::unreachable(host, e))?;
        serde_json::from_slice(&body).map_err(|e| RelayError::malformed(host, e))
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn video(&self, host: &str, video_id: &str) -> RelayResult<VideoDetails> {
        let url = self.api_url(host, "videos", video_id)?;
        self.get_json(host, url).await
    }

    async fn playlist(&self, host: &str, playlist_id: &str) -> RelayResult<PlaylistDetails> {
        let url = self.api_url(host, "playlists", playlist_id)?;
        self.get_json(host, url).await
    }

    async fn probe(&self, host: &str) -> RelayResult<()> {
        let response = self
            .client
            .get(self.url(host, &self.health_path))
            .send()
            .await
            .map_err(|e| RelayError::unreachable(host, e))?;

        // Redirects and other non-error statuses still prove the instance is up.
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(RelayError::unreachable(host, format!("HTTP {}", status)));
        }
        Ok(())
    }
}
