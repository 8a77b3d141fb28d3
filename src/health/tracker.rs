//! Rolling per-instance performance record.
//!
//! # Responsibilities
//! - Keep the last N (latency, success) samples for each instance
//! - Derive success rate and mean latency on demand
//!
//! # Design Decisions
//! - Stats are recomputed from history, never cached
//! - History is bounded per host; memory does not grow over a session
//! - A host with no samples has rate 0 and infinite latency (ranks last)

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One probe or API attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSample {
    /// `None` when the attempt failed before a response was measurable.
    pub latency: Option<Duration>,
    pub success: bool,
    pub timestamp: Instant,
}

/// Thread-safe rolling sample store keyed by host.
#[derive(Debug)]
pub struct PerformanceTracker {
    window: usize,
    history: DashMap<String, VecDeque<HealthSample>>,
}

impl PerformanceTracker {
    pub const DEFAULT_WINDOW: usize = 20;

    /// Create a tracker that keeps `window` samples per host (at least one).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            history: DashMap::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record an outcome, dropping the oldest sample beyond the window.
    pub fn add_result(&self, host: &str, latency: Option<Duration>, success: bool) {
        let sample = HealthSample {
            latency,
            success,
            timestamp: Instant::now(),
        };
        let mut samples = self.history.entry(host.to_string()).or_default();
        samples.push_back(sample);
        while samples.len() > self.window {
            samples.pop_front();
        }
    }

    /// Fraction of successful samples in `[0, 1]`; 0 with no history.
    pub fn success_rate(&self, host: &str) -> f64 {
        match self.history.get(host) {
            Some(samples) if !samples.is_empty() => {
                let successes = samples.iter().filter(|s| s.success).count();
                successes as f64 / samples.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Mean latency of successful samples in milliseconds; +inf when unknown.
    pub fn avg_latency_ms(&self, host: &str) -> f64 {
        let Some(samples) = self.history.get(host) else {
            return f64::INFINITY;
        };
        let (total, count) = samples
            .iter()
            .filter(|s| s.success)
            .filter_map(|s| s.latency)
            .fold((0.0, 0usize), |(sum, n), l| (sum + l.as_secs_f64() * 1000.0, n + 1));
        if count == 0 {
            f64::INFINITY
        } else {
            total / count as f64
        }
    }

    pub fn sample_count(&self, host: &str) -> usize {
        self.history.get(host).map(|s| s.len()).unwrap_or(0)
    }

    pub fn failure_count(&self, host: &str) -> usize {
        self.history
            .get(host)
            .map(|s| s.iter().filter(|s| !s.success).count())
            .unwrap_or(0)
    }

    /// Most recent sample for a host.
    pub fn last_sample(&self, host: &str) -> Option<HealthSample> {
        self.history.get(host).and_then(|s| s.back().copied())
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}
