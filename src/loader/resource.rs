//! Relay API failover.
//!
//! # Responsibilities
//! - Fetch a video or playlist through the pool, one instance per attempt
//! - Record every attempt in the tracker and circuit breaker
//! - Report pool exhaustion distinctly from bad input
//!
//! # Design Decisions
//! - At most one attempt per pool member, counted explicitly
//! - A fixed pause separates attempts
//! - Malformed payloads rotate exactly like network errors

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LoaderConfig;
use crate::health::PerformanceTracker;
use crate::observability::metrics;
use crate::pool::{Instance, InstanceRotator};
use crate::relay::{LoadTarget, RelayApi, RelayData, RelayError, RelayResult};
use crate::resilience::{with_deadline, CircuitBreaker, Timed};

/// Content fetched from a specific instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loaded {
    pub instance: Instance,
    pub data: RelayData,
}

pub struct ResourceLoader {
    api: Arc<dyn RelayApi>,
    rotator: Arc<InstanceRotator>,
    tracker: Arc<PerformanceTracker>,
    breaker: Arc<CircuitBreaker>,
    config: LoaderConfig,
}

impl ResourceLoader {
    pub fn new(
        api: Arc<dyn RelayApi>,
        rotator: Arc<InstanceRotator>,
        tracker: Arc<PerformanceTracker>,
        breaker: Arc<CircuitBreaker>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            api,
            rotator,
            tracker,
            breaker,
            config,
        }
    }

    pub fn rotator(&self) -> &Arc<InstanceRotator> {
        &self.rotator
    }

    /// Fetch `target` from the first instance that answers with a valid payload.
    ///
    /// # Errors
    /// - `InvalidInput` for an `Invalid` target or a malformed id, without
    ///   touching the pool
    /// - `AllInstancesFailed` once every pool member has been tried
    pub async fn load(&self, target: &LoadTarget) -> RelayResult<Loaded> {
        if !target.is_valid() {
            return Err(RelayError::InvalidInput(
                "expected a video or playlist URL".to_string(),
            ));
        }

        let attempts = self.rotator.len();
        let mut instance = self.rotator.get_healthy_instance();

        for attempt in 1..=attempts {
            tracing::debug!(host = %instance.host, attempt, attempts, "Relay attempt");

            let Timed { result, elapsed } = with_deadline(
                &instance.host,
                self.config.attempt_timeout(),
                self.fetch(&instance.host, target),
            )
            .await;

            match result {
                Ok(data) => {
                    self.report_success(&instance, elapsed);
                    tracing::info!(host = %instance.host, attempt, title = data.title(), "Loaded from relay");
                    return Ok(Loaded { instance, data });
                }
                Err(err) => {
                    self.report_failure(&instance, &err, Some(elapsed));
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay()).await;
                        instance = self.rotator.current();
                    }
                }
            }
        }

        tracing::warn!(attempts, "Every relay instance failed");
        Err(RelayError::AllInstancesFailed { attempts })
    }

    async fn fetch(&self, host: &str, target: &LoadTarget) -> RelayResult<RelayData> {
        match target {
            LoadTarget::Video { video_id } => self
                .api
                .video(host, video_id)
                .await?
                .validate(host)
                .map(RelayData::Video),
            LoadTarget::Playlist { playlist_id } => self
                .api
                .playlist(host, playlist_id)
                .await?
                .validate(host)
                .map(RelayData::Playlist),
            LoadTarget::Invalid => Err(RelayError::InvalidInput("no target".to_string())),
        }
    }

    /// Record a successful attempt against `instance`.
    pub fn report_success(&self, instance: &Instance, elapsed: Duration) {
        self.tracker.add_result(&instance.host, Some(elapsed), true);
        self.breaker.record_success(&instance.host);
        metrics::record_attempt(&instance.host, "ok");
    }

    /// Record a failed attempt against `instance` and rotate past it.
    ///
    /// `elapsed` is only kept for failures where the instance did answer.
    pub fn report_failure(&self, instance: &Instance, err: &RelayError, elapsed: Option<Duration>) {
        let latency = match err {
            RelayError::MalformedPayload { .. } => elapsed,
            _ => None,
        };
        match err {
            RelayError::MalformedPayload { reason, .. } => {
                tracing::warn!(host = %instance.host, reason = %reason, "Relay returned malformed payload")
            }
            RelayError::EmbedDisplayFailure { reason, .. } => {
                tracing::warn!(host = %instance.host, reason = %reason, "Relay embed failed to load")
            }
            other => tracing::warn!(host = %instance.host, error = %other, "Relay unreachable"),
        }

        self.tracker.add_result(&instance.host, latency, false);
        metrics::record_attempt(&instance.host, err.kind());
        self.rotator.fail_instance_and_rotate(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::relay::testing::{Behavior, ScriptedRelay};

    struct Fixture {
        api: Arc<ScriptedRelay>,
        loader: ResourceLoader,
        tracker: Arc<PerformanceTracker>,
        breaker: Arc<CircuitBreaker>,
    }

    fn fixture(api: ScriptedRelay, hosts: &[&str]) -> Fixture {
        let api = Arc::new(api);
        let tracker = Arc::new(PerformanceTracker::default());
        let breaker = Arc::new(CircuitBreaker::new(3, Duration::from_secs(300)));
        let rotator = Arc::new(
            InstanceRotator::new(
                hosts.iter().map(|h| Instance::new(*h, *h)).collect(),
                tracker.clone(),
                breaker.clone(),
                EventBus::default(),
            )
            .unwrap(),
        );
        let loader = ResourceLoader::new(
            api.clone(),
            rotator,
            tracker.clone(),
            breaker.clone(),
            LoaderConfig::default(),
        );
        Fixture {
            api,
            loader,
            tracker,
            breaker,
        }
    }

    fn playlist(id: &str) -> LoadTarget {
        LoadTarget::Playlist {
            playlist_id: id.into(),
        }
    }

    fn video(id: &str) -> LoadTarget {
        LoadTarget::Video {
            video_id: id.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_playlist_from_third_instance() {
        let f = fixture(
            ScriptedRelay::new().with("i3", Behavior::Up),
            &["i1", "i2", "i3"],
        );

        let loaded = f.loader.load(&playlist("PL123")).await.unwrap();

        assert_eq!(loaded.instance.host, "i3");
        match loaded.data {
            RelayData::Playlist(p) => assert_eq!(p.videos.len(), 2),
            other => panic!("expected playlist, got {:?}", other),
        }
        assert_eq!(f.breaker.consecutive_failures("i1"), 1);
        assert_eq!(f.breaker.consecutive_failures("i2"), 1);
        assert_eq!(f.tracker.failure_count("i1"), 1);
        assert_eq!(f.tracker.failure_count("i2"), 1);
        assert_eq!(f.tracker.success_rate("i3"), 1.0);
        assert_eq!(f.loader.rotator().current().host, "i3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_instances_fail() {
        let f = fixture(ScriptedRelay::new(), &["i1", "i2", "i3"]);

        let err = f.loader.load(&video("abc123")).await.unwrap_err();

        assert_eq!(err, RelayError::AllInstancesFailed { attempts: 3 });
        for host in ["i1", "i2", "i3"] {
            assert_eq!(f.api.calls(host), 1);
            assert_eq!(f.breaker.consecutive_failures(host), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_target_touches_nothing() {
        let f = fixture(ScriptedRelay::new().with("i1", Behavior::Up), &["i1"]);

        let err = f.loader.load(&LoadTarget::Invalid).await.unwrap_err();

        assert!(matches!(err, RelayError::InvalidInput(_)));
        assert_eq!(f.api.calls("i1"), 0);

        let err = f.loader.load(&video("../stats")).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(_)));
        assert_eq!(f.api.calls("i1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_rotates() {
        let f = fixture(
            ScriptedRelay::new()
                .with("i1", Behavior::Malformed)
                .with("i2", Behavior::Up),
            &["i1", "i2"],
        );

        let loaded = f.loader.load(&video("abc123")).await.unwrap();

        assert_eq!(loaded.instance.host, "i2");
        assert_eq!(f.breaker.consecutive_failures("i1"), 1);
        // The instance answered, so the failure carries a latency.
        assert!(f.tracker.last_sample("i1").unwrap().latency.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_instance_times_out_and_rotates() {
        let f = fixture(
            ScriptedRelay::new()
                .with("i1", Behavior::Slow(Duration::from_secs(60)))
                .with("i2", Behavior::Up),
            &["i1", "i2"],
        );

        let loaded = f.loader.load(&video("abc123")).await.unwrap();

        assert_eq!(loaded.instance.host, "i2");
        assert_eq!(f.tracker.last_sample("i1").unwrap().latency, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_attempts() {
        let f = fixture(ScriptedRelay::new(), &["i1", "i2", "i3"]);

        let start = tokio::time::Instant::now();
        let _ = f.loader.load(&video("abc123")).await;

        // Two pauses between three attempts, none after the last.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_skipped_on_first_attempt() {
        let f = fixture(
            ScriptedRelay::new()
                .with("i1", Behavior::Up)
                .with("i2", Behavior::Up),
            &["i1", "i2"],
        );
        for _ in 0..3 {
            f.breaker.record_failure("i1");
        }

        let loaded = f.loader.load(&video("abc123")).await.unwrap();

        assert_eq!(loaded.instance.host, "i2");
        assert_eq!(f.api.calls("i1"), 0);
    }
}
