//! Instance rotation.
//!
//! # Responsibilities
//! - Own the ordered instance list and the "current" cursor
//! - Rank instances by observed health
//! - Skip blacklisted instances when choosing or rotating
//!
//! # Design Decisions
//! - The list is swapped wholesale on re-rank (readers never block)
//! - List length is fixed for a session; only order changes
//! - Every scan is bounded by one lap of the pool

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::events::{EventBus, RelayEvent};
use crate::health::PerformanceTracker;
use crate::observability::metrics;
use crate::pool::{Instance, InstanceView, PoolError};
use crate::resilience::CircuitBreaker;

/// Ordered instance pool with a rotating cursor.
#[derive(Debug)]
pub struct InstanceRotator {
    instances: ArcSwap<Vec<Instance>>,
    current: AtomicUsize,
    tracker: Arc<PerformanceTracker>,
    breaker: Arc<CircuitBreaker>,
    events: EventBus,
}

impl InstanceRotator {
    /// Create a rotator over `instances` in configured priority order.
    pub fn new(
        instances: Vec<Instance>,
        tracker: Arc<PerformanceTracker>,
        breaker: Arc<CircuitBreaker>,
        events: EventBus,
    ) -> Result<Self, PoolError> {
        if instances.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self {
            instances: ArcSwap::from_pointee(instances),
            current: AtomicUsize::new(0),
            tracker,
            breaker,
            events,
        })
    }

    pub fn len(&self) -> usize {
        self.instances.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.load().is_empty()
    }

    /// Current order.
    pub fn instances(&self) -> Arc<Vec<Instance>> {
        self.instances.load_full()
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    pub fn current(&self) -> Instance {
        let list = self.instances.load();
        list[self.current_index() % list.len()].clone()
    }

    /// Reorder by descending success rate, then ascending latency.
    ///
    /// The sort is stable, so instances with equal stats keep their order.
    pub fn rank(&self) {
        let list = self.instances.load_full();
        let previous = list[self.current_index() % list.len()].host.clone();

        let mut scored: Vec<(f64, f64, &Instance)> = list
            .iter()
            .map(|i| {
                (
                    self.tracker.success_rate(&i.host),
                    self.tracker.avg_latency_ms(&i.host),
                    i,
                )
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.total_cmp(&b.1)));

        for (rate, _, instance) in &scored {
            metrics::record_instance_success_rate(&instance.host, *rate);
        }

        let ranked: Vec<Instance> = scored.into_iter().map(|(_, _, i)| i.clone()).collect();
        let len = ranked.len();
        tracing::debug!(
            order = ?ranked.iter().map(|i| i.host.as_str()).collect::<Vec<_>>(),
            "Instances ranked"
        );
        self.instances.store(Arc::new(ranked));

        if self.current_index() >= len {
            self.current.store(0, Ordering::Relaxed);
        }

        let active = self.current();
        if active.host != previous {
            self.events.publish(RelayEvent::ActiveInstanceChanged { instance: active });
        }
        self.events.publish(RelayEvent::RankingChanged {
            instances: self.snapshot(),
        });
    }

    /// First instance at or after the cursor whose circuit is closed.
    ///
    /// The cursor moves to the returned instance. If every circuit is open
    /// the current instance is returned anyway.
    pub fn get_healthy_instance(&self) -> Instance {
        let list = self.instances.load_full();
        let len = list.len();
        let start = self.current_index() % len;

        for offset in 0..len {
            let idx = (start + offset) % len;
            if !self.breaker.is_open(&list[idx].host) {
                self.set_current(&list, idx);
                return list[idx].clone();
            }
        }

        tracing::warn!("Every instance is blacklisted, using current instance");
        list[start].clone()
    }

    /// Record a failure on the current instance and move past it.
    pub fn fail_and_rotate(&self) {
        let failed = self.current();
        self.fail_instance_and_rotate(&failed);
    }

    /// Record a failure on `failed` and advance the cursor past it to the
    /// next closed circuit, stopping after one lap.
    pub fn fail_instance_and_rotate(&self, failed: &Instance) {
        self.breaker.record_failure(&failed.host);

        let list = self.instances.load_full();
        let len = list.len();
        let start = list
            .iter()
            .position(|i| i.host == failed.host)
            .unwrap_or_else(|| self.current_index() % len);

        let mut idx = start;
        for _ in 0..len {
            idx = (idx + 1) % len;
            if !self.breaker.is_open(&list[idx].host) {
                break;
            }
        }

        tracing::info!(failed = %failed.host, next = %list[idx].host, "Rotating instance");
        self.set_current(&list, idx);
    }

    /// Point the cursor at `host`. Returns false for an unknown host.
    pub fn select(&self, host: &str) -> bool {
        let list = self.instances.load_full();
        match list.iter().position(|i| i.host == host) {
            Some(idx) => {
                self.set_current(&list, idx);
                true
            }
            None => false,
        }
    }

    /// Views of all instances in current order.
    pub fn snapshot(&self) -> Vec<InstanceView> {
        let list = self.instances.load();
        let active = self.current_index() % list.len();
        list.iter()
            .enumerate()
            .map(|(idx, i)| InstanceView::capture(i, &self.tracker, &self.breaker, idx == active))
            .collect()
    }

    fn set_current(&self, list: &[Instance], idx: usize) {
        let previous = self.current.swap(idx, Ordering::Relaxed);
        let changed = list.get(previous).map(|p| p.host != list[idx].host).unwrap_or(true);
        if changed {
            self.events.publish(RelayEvent::ActiveInstanceChanged {
                instance: list[idx].clone(),
            });
        }
    }
}
