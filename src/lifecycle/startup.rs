//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every component from a validated config, in dependency order
//! - Run the initial probe scan and ranking before traffic is served
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Components are constructed here and injected; nothing is global
//! - The background monitor and the listener start after the scan (see http::server)

use std::sync::Arc;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::events::EventBus;
use crate::health::{HealthMonitor, PerformanceTracker, ProbeSummary};
use crate::loader::{EmbedUrls, ResourceLoader};
use crate::player::{Player, RemoteSurface};
use crate::pool::{Instance, InstanceRotator, PoolError};
use crate::relay::{HttpRelayClient, RelayApi};
use crate::resilience::CircuitBreaker;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind listener: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Every long-lived component, wired together.
pub struct Engine {
    pub config: RelayConfig,
    pub events: EventBus,
    pub tracker: Arc<PerformanceTracker>,
    pub breaker: Arc<CircuitBreaker>,
    pub rotator: Arc<InstanceRotator>,
    pub monitor: Arc<HealthMonitor>,
    pub loader: Arc<ResourceLoader>,
    pub surface: Arc<RemoteSurface>,
    pub player: Arc<Player>,
}

impl Engine {
    /// Build against real relay instances over HTTP.
    pub fn build(config: RelayConfig) -> Result<Self, StartupError> {
        let api = HttpRelayClient::new(&config.loader.scheme, &config.health_check.path)?;
        Self::with_api(config, Arc::new(api))
    }

    /// Build against any `RelayApi`.
    pub fn with_api(config: RelayConfig, api: Arc<dyn RelayApi>) -> Result<Self, StartupError> {
        let events = EventBus::default();
        let tracker = Arc::new(PerformanceTracker::new(config.health_check.history_window));
        let breaker = Arc::new(CircuitBreaker::new(
            config.circuit_breaker.max_failures,
            config.circuit_breaker.blacklist_duration(),
        ));

        let instances: Vec<Instance> = config.instances.iter().map(Instance::from).collect();
        let rotator = Arc::new(InstanceRotator::new(
            instances,
            tracker.clone(),
            breaker.clone(),
            events.clone(),
        )?);

        let monitor = Arc::new(HealthMonitor::new(
            api.clone(),
            rotator.clone(),
            tracker.clone(),
            breaker.clone(),
            config.health_check.clone(),
        ));
        let loader = Arc::new(ResourceLoader::new(
            api,
            rotator.clone(),
            tracker.clone(),
            breaker.clone(),
            config.loader.clone(),
        ));

        let surface = Arc::new(RemoteSurface::new(events.clone()));
        let player = Arc::new(Player::new(
            loader.clone(),
            surface.clone(),
            EmbedUrls::new(&config.loader.scheme, &config.embed),
            events.clone(),
            config.embed.timeout(),
        ));

        tracing::info!(
            instances = rotator.len(),
            max_failures = config.circuit_breaker.max_failures,
            blacklist_secs = config.circuit_breaker.blacklist_secs,
            "Engine initialized"
        );

        Ok(Self {
            config,
            events,
            tracker,
            breaker,
            rotator,
            monitor,
            loader,
            surface,
            player,
        })
    }

    /// Probe every instance once and rank the pool.
    pub async fn initial_scan(&self) -> ProbeSummary {
        tracing::info!("Scanning instances");
        let summary = self.monitor.probe_all().await;
        self.rotator.rank();
        tracing::info!(
            healthy = summary.healthy,
            total = summary.total,
            active = %self.rotator.current().host,
            "Ready"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstanceConfig;
    use crate::relay::testing::{Behavior, ScriptedRelay};

    fn config(hosts: &[&str]) -> RelayConfig {
        RelayConfig {
            instances: hosts
                .iter()
                .map(|h| InstanceConfig {
                    host: h.to_string(),
                    name: None,
                })
                .collect(),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn test_empty_pool_is_fatal() {
        let result = Engine::with_api(config(&[]), Arc::new(ScriptedRelay::new()));
        assert!(matches!(result, Err(StartupError::Pool(PoolError::Empty))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_scan_ranks_responsive_first() {
        let api = ScriptedRelay::new().with("b", Behavior::Up);
        let engine = Engine::with_api(config(&["a", "b"]), Arc::new(api)).unwrap();

        let summary = engine.initial_scan().await;

        assert_eq!(summary, ProbeSummary { healthy: 1, total: 2 });
        assert_eq!(engine.rotator.current().host, "b");
    }
}
