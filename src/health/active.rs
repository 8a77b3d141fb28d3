//! Active health checking.
//!
//! # Responsibilities
//! - Probe every instance's health endpoint, concurrently
//! - Feed outcomes into the tracker and circuit breaker
//! - Re-rank the pool after each background cycle
//!
//! # Design Decisions
//! - A probe never fails its caller; errors become failure samples
//! - At most one cycle runs at a time: the timer skips a busy cycle,
//!   manual `probe_all` calls queue behind it

use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::PerformanceTracker;
use crate::observability::metrics;
use crate::pool::{Instance, InstanceRotator};
use crate::relay::RelayApi;
use crate::resilience::{with_deadline, CircuitBreaker, Timed};

/// Aggregate result of one probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
    pub healthy: usize,
    pub total: usize,
}

pub struct HealthMonitor {
    api: Arc<dyn RelayApi>,
    rotator: Arc<InstanceRotator>,
    tracker: Arc<PerformanceTracker>,
    breaker: Arc<CircuitBreaker>,
    config: HealthCheckConfig,
    cycle: Mutex<()>,
}

impl HealthMonitor {
    pub fn new(
        api: Arc<dyn RelayApi>,
        rotator: Arc<InstanceRotator>,
        tracker: Arc<PerformanceTracker>,
        breaker: Arc<CircuitBreaker>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            api,
            rotator,
            tracker,
            breaker,
            config,
            cycle: Mutex::new(()),
        }
    }

    /// Probe one instance and record the outcome. Returns whether it answered.
    pub async fn probe(&self, instance: &Instance) -> bool {
        let host = instance.host.as_str();
        let Timed { result, elapsed } =
            with_deadline(host, self.config.timeout(), self.api.probe(host)).await;

        match result {
            Ok(()) => {
                self.tracker.add_result(host, Some(elapsed), true);
                self.breaker.record_success(host);
                metrics::record_probe(host, true, Some(elapsed));
                tracing::debug!(host, latency_ms = elapsed.as_millis() as u64, "Probe ok");
                true
            }
            Err(e) => {
                self.tracker.add_result(host, None, false);
                self.breaker.record_failure(host);
                metrics::record_probe(host, false, None);
                tracing::warn!(host, error = %e, "Probe failed");
                false
            }
        }
    }

    /// Probe every instance concurrently, waiting for any running cycle first.
    pub async fn probe_all(&self) -> ProbeSummary {
        let _cycle = self.cycle.lock().await;
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> ProbeSummary {
        let instances = self.rotator.instances();
        let results = join_all(instances.iter().map(|i| self.probe(i))).await;

        let summary = ProbeSummary {
            healthy: results.iter().filter(|ok| **ok).count(),
            total: results.len(),
        };
        tracing::info!(
            healthy = summary.healthy,
            total = summary.total,
            "Probe cycle complete"
        );
        summary
    }

    /// Timer-driven cycle. Skipped if another cycle holds the lock.
    async fn background_cycle(&self) {
        let Ok(_cycle) = self.cycle.try_lock() else {
            tracing::debug!("Probe cycle still running, skipping tick");
            return;
        };
        self.run_cycle().await;
        self.rotator.rank();
    }

    /// Probe on the configured interval until shutdown.
    ///
    /// The first cycle runs one interval after start; startup performs
    /// its own initial scan.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Background health checks disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.background_cycle().await,
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    pub fn start_background(self: &Arc<Self>, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(shutdown))
    }
}
