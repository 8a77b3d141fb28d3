//! In-memory `RelayApi` for unit tests.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

use crate::relay::{PlaylistDetails, PlaylistEntry, RelayApi, RelayError, RelayResult, VideoDetails};

/// How a scripted host answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Up,
    Down,
    /// Answers with an empty payload.
    Malformed,
    /// Answers like `Up` after the delay.
    Slow(Duration),
}

/// Hosts default to `Down` until scripted.
#[derive(Debug, Default)]
pub struct ScriptedRelay {
    behaviors: DashMap<String, Behavior>,
    calls: DashMap<String, usize>,
}

impl ScriptedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, host: &str, behavior: Behavior) -> Self {
        self.set(host, behavior);
        self
    }

    pub fn set(&self, host: &str, behavior: Behavior) {
        self.behaviors.insert(host.to_string(), behavior);
    }

    pub fn calls(&self, host: &str) -> usize {
        self.calls.get(host).map(|c| *c).unwrap_or(0)
    }

    async fn answer(&self, host: &str) -> RelayResult<bool> {
        *self.calls.entry(host.to_string()).or_default() += 1;
        let behavior = self.behaviors.get(host).map(|b| *b).unwrap_or(Behavior::Down);
        match behavior {
            Behavior::Up => Ok(true),
            Behavior::Malformed => Ok(false),
            Behavior::Down => Err(RelayError::unreachable(host, "connection refused")),
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl RelayApi for ScriptedRelay {
    async fn video(&self, host: &str, video_id: &str) -> RelayResult<VideoDetails> {
        let populated = self.answer(host).await?;
        Ok(VideoDetails {
            title: if populated { format!("{video_id} via {host}") } else { String::new() },
            video_id: video_id.to_string(),
            length_seconds: Some(212),
            author: None,
            view_count: None,
            published: None,
            description: None,
        })
    }

    async fn playlist(&self, host: &str, playlist_id: &str) -> RelayResult<PlaylistDetails> {
        let populated = self.answer(host).await?;
        let videos = if populated {
            vec![
                PlaylistEntry {
                    video_id: "first".into(),
                    title: "First".into(),
                    length_seconds: Some(61),
                    author: None,
                },
                PlaylistEntry {
                    video_id: "second".into(),
                    title: "Second".into(),
                    length_seconds: None,
                    author: None,
                },
            ]
        } else {
            Vec::new()
        };
        Ok(PlaylistDetails {
            title: playlist_id.to_string(),
            videos,
        })
    }

    async fn probe(&self, host: &str) -> RelayResult<()> {
        self.answer(host).await.map(|_| ())
    }
}
