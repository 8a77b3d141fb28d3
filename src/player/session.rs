//! Load-and-display orchestration.
//!
//! # Responsibilities
//! - Turn a pasted URL into content on the embed surface
//! - Fail over between instances when the embed page does not load
//! - Fall back to the original provider when the pool is exhausted
//! - Keep superseded loads away from the surface
//!
//! # Design Decisions
//! - Every request gets a generation; starting one cancels the previous
//! - Only the current generation may navigate the surface or publish a result
//! - Embed failures are recorded and rotated exactly like API failures

use arc_swap::{ArcSwap, ArcSwapOption};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::events::{EventBus, LoadOutcome, RelayEvent};
use crate::loader::{EmbedUrls, ResourceLoader};
use crate::observability::metrics;
use crate::player::{DisplayKey, EmbedSurface};
use crate::pool::Instance;
use crate::relay::{LoadTarget, RelayData, RelayError, RelayResult};

/// What a play request ended up showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlayOutcome {
    /// The relay embed on `instance` confirmed its load.
    Playing {
        generation: u64,
        instance: Instance,
        url: String,
        title: String,
    },
    /// The original provider's embed was shown instead.
    Fallback {
        generation: u64,
        url: String,
        reason: String,
    },
    /// Nothing could be shown.
    Failed { generation: u64, reason: String },
    /// A newer request took over before this one finished.
    Superseded { generation: u64 },
}

impl PlayOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            PlayOutcome::Playing { generation, .. }
            | PlayOutcome::Fallback { generation, .. }
            | PlayOutcome::Failed { generation, .. }
            | PlayOutcome::Superseded { generation } => *generation,
        }
    }

    fn load_outcome(&self) -> Option<LoadOutcome> {
        match self {
            PlayOutcome::Playing { .. } => Some(LoadOutcome::Loaded),
            PlayOutcome::Fallback { .. } => Some(LoadOutcome::Fallback),
            PlayOutcome::Failed { .. } => Some(LoadOutcome::AllFailed),
            PlayOutcome::Superseded { .. } => None,
        }
    }

    fn message(&self) -> String {
        match self {
            PlayOutcome::Playing {
                instance, title, ..
            } => format!("Playing {} via {}", title, instance.display_name),
            PlayOutcome::Fallback { reason, .. } => {
                format!("Relay unavailable ({}), playing from the original provider", reason)
            }
            PlayOutcome::Failed { reason, .. } => reason.clone(),
            PlayOutcome::Superseded { .. } => String::new(),
        }
    }
}

/// The content currently on the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub generation: u64,
    pub target: LoadTarget,
    pub instance: Instance,
    pub video_id: String,
    pub data: RelayData,
}

pub struct Player {
    loader: Arc<ResourceLoader>,
    surface: Arc<dyn EmbedSurface>,
    urls: EmbedUrls,
    events: EventBus,
    embed_timeout: Duration,
    generation: AtomicU64,
    active: ArcSwap<CancellationToken>,
    now_playing: ArcSwapOption<NowPlaying>,
}

impl Player {
    pub fn new(
        loader: Arc<ResourceLoader>,
        surface: Arc<dyn EmbedSurface>,
        urls: EmbedUrls,
        events: EventBus,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            loader,
            surface,
            urls,
            events,
            embed_timeout,
            generation: AtomicU64::new(0),
            active: ArcSwap::from_pointee(CancellationToken::new()),
            now_playing: ArcSwapOption::empty(),
        }
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn now_playing(&self) -> Option<Arc<NowPlaying>> {
        self.now_playing.load_full()
    }

    /// Load `input` and show it, superseding any request in flight.
    ///
    /// # Errors
    /// `InvalidInput` when `input` is not a video or playlist URL. The
    /// request in flight, if any, is left alone in that case.
    pub async fn play(&self, input: &str) -> RelayResult<PlayOutcome> {
        let target = LoadTarget::parse(input);
        if !target.is_valid() {
            let err = RelayError::InvalidInput(input.trim().to_string());
            metrics::record_load_result("invalid");
            self.events.publish(RelayEvent::LoadResult {
                generation: self.generation(),
                outcome: LoadOutcome::Invalid,
                message: err.to_string(),
            });
            return Err(err);
        }

        let (generation, cancel) = self.begin();
        tracing::info!(generation, target = ?target, "Load requested");

        let work = async {
            match self.loader.load(&target).await {
                Ok(loaded) => {
                    let video_id = loaded
                        .data
                        .first_video_id()
                        .or_else(|| target.id())
                        .unwrap_or_default()
                        .to_string();
                    self.show_relay(generation, &target, loaded.instance, video_id, loaded.data, &cancel)
                        .await
                }
                Err(err) => {
                    let key = DisplayKey::new(generation, 1);
                    self.show_fallback(key, &target, None, err, &cancel).await
                }
            }
        };
        Ok(self.settle(generation, &cancel, work).await)
    }

    /// Show entry `index` of the playlist on the surface.
    ///
    /// Starts on the instance that served the playlist and fails over like
    /// `play`.
    pub async fn play_entry(&self, index: usize) -> RelayResult<PlayOutcome> {
        let current = self
            .now_playing()
            .ok_or_else(|| RelayError::InvalidInput("nothing is loaded".to_string()))?;
        let RelayData::Playlist(playlist) = &current.data else {
            return Err(RelayError::InvalidInput("current item is not a playlist".to_string()));
        };
        let entry = playlist.videos.get(index).ok_or_else(|| {
            RelayError::InvalidInput(format!(
                "playlist has {} entries, no index {}",
                playlist.videos.len(),
                index
            ))
        })?;

        let (generation, cancel) = self.begin();
        tracing::info!(generation, index, video_id = %entry.video_id, "Playlist entry requested");

        let work = self.show_relay(
            generation,
            &current.target,
            current.instance.clone(),
            entry.video_id.clone(),
            current.data.clone(),
            &cancel,
        );
        Ok(self.settle(generation, &cancel, work).await)
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        self.active.swap(Arc::new(cancel.clone())).cancel();
        (generation, cancel)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    async fn settle<F>(&self, generation: u64, cancel: &CancellationToken, work: F) -> PlayOutcome
    where
        F: Future<Output = PlayOutcome>,
    {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => PlayOutcome::Superseded { generation },
            outcome = work => outcome,
        };

        if !self.is_current(generation) {
            tracing::debug!(generation, "Discarding superseded load");
            return PlayOutcome::Superseded { generation };
        }

        if let Some(kind) = outcome.load_outcome() {
            metrics::record_load_result(match kind {
                LoadOutcome::Loaded => "loaded",
                LoadOutcome::Fallback => "fallback",
                LoadOutcome::AllFailed => "all_failed",
                LoadOutcome::Invalid => "invalid",
            });
            self.events.publish(RelayEvent::LoadResult {
                generation,
                outcome: kind,
                message: outcome.message(),
            });
        }
        outcome
    }

    /// Embed on `instance`, rotating through the pool while the surface
    /// refuses to confirm.
    async fn show_relay(
        &self,
        generation: u64,
        target: &LoadTarget,
        mut instance: Instance,
        video_id: String,
        data: RelayData,
        cancel: &CancellationToken,
    ) -> PlayOutcome {
        let playlist_id = match target {
            LoadTarget::Playlist { playlist_id } => Some(playlist_id.as_str()),
            _ => None,
        };
        let rotator = self.loader.rotator();
        let attempts = rotator.len();

        for attempt in 1..=attempts {
            let url = self.urls.relay(&instance.host, &video_id, playlist_id);
            let start = Instant::now();
            let key = DisplayKey::new(generation, attempt);
            match self.display(key, &instance.host, &url, cancel).await {
                Ok(()) => {
                    self.loader.report_success(&instance, start.elapsed());
                    tracing::info!(generation, host = %instance.host, attempt, "Embed loaded");
                    if self.is_current(generation) {
                        self.now_playing.store(Some(Arc::new(NowPlaying {
                            generation,
                            target: target.clone(),
                            instance: instance.clone(),
                            video_id: video_id.clone(),
                            data: data.clone(),
                        })));
                    }
                    return PlayOutcome::Playing {
                        generation,
                        instance,
                        url,
                        title: data.title().to_string(),
                    };
                }
                Err(err) => {
                    self.loader.report_failure(&instance, &err, None);
                    if attempt < attempts {
                        instance = rotator.get_healthy_instance();
                    }
                }
            }
        }

        let err = RelayError::AllInstancesFailed { attempts };
        let key = DisplayKey::new(generation, attempts + 1);
        self.show_fallback(key, target, Some(&video_id), err, cancel)
            .await
    }

    async fn show_fallback(
        &self,
        key: DisplayKey,
        target: &LoadTarget,
        video_id: Option<&str>,
        reason: RelayError,
        cancel: &CancellationToken,
    ) -> PlayOutcome {
        let generation = key.generation;
        let Some(url) = self.urls.fallback(target, video_id) else {
            return PlayOutcome::Failed {
                generation,
                reason: reason.to_string(),
            };
        };

        tracing::warn!(generation, error = %reason, url = %url, "Falling back to original provider");
        if let Err(err) = self.display(key, "fallback", &url, cancel).await {
            tracing::warn!(generation, error = %err, "Fallback embed was not confirmed");
        }
        if self.is_current(generation) {
            self.now_playing.store(None);
        }
        PlayOutcome::Fallback {
            generation,
            url,
            reason: reason.to_string(),
        }
    }

    async fn display(
        &self,
        key: DisplayKey,
        host: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> RelayResult<()> {
        let shown = self.surface.display(key, url, cancel.clone());
        match tokio::time::timeout(self.embed_timeout, shown).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(RelayError::EmbedDisplayFailure {
                host: host.to_string(),
                reason: err.to_string(),
            }),
            Err(_) => Err(RelayError::EmbedDisplayFailure {
                host: host.to_string(),
                reason: format!(
                    "no load confirmation within {}ms",
                    self.embed_timeout.as_millis()
                ),
            }),
        }
    }
}
