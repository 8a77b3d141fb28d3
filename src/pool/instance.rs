//! Relay instance identity and display snapshot.
//!
//! # Responsibilities
//! - Represent a single relay instance (immutable host + display name)
//! - Summarize tracker and breaker state for the UI

use serde::{Deserialize, Serialize};

use crate::config::InstanceConfig;
use crate::health::PerformanceTracker;
use crate::resilience::CircuitBreaker;

/// A single relay instance. `host` is the key used everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
    pub host: String,
    pub display_name: String,
}

impl Instance {
    pub fn new(host: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            display_name: display_name.into(),
        }
    }
}

impl From<&InstanceConfig> for Instance {
    fn from(config: &InstanceConfig) -> Self {
        Self {
            host: config.host.clone(),
            display_name: config.name.clone().unwrap_or_else(|| config.host.clone()),
        }
    }
}

/// Coarse health bucket shown next to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIndicator {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthIndicator {
    pub fn from_success_rate(rate: f64) -> Self {
        if rate > 0.8 {
            HealthIndicator::Healthy
        } else if rate > 0.4 {
            HealthIndicator::Degraded
        } else {
            HealthIndicator::Unhealthy
        }
    }
}

/// Point-in-time view of an instance for selectors and status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceView {
    pub host: String,
    pub display_name: String,
    pub success_rate: f64,
    /// `None` until the instance has a successful sample.
    pub avg_latency_ms: Option<f64>,
    pub samples: usize,
    pub circuit_open: bool,
    pub consecutive_failures: u32,
    pub indicator: HealthIndicator,
    pub active: bool,
}

impl InstanceView {
    pub fn capture(
        instance: &Instance,
        tracker: &PerformanceTracker,
        breaker: &CircuitBreaker,
        active: bool,
    ) -> Self {
        let success_rate = tracker.success_rate(&instance.host);
        let latency = tracker.avg_latency_ms(&instance.host);
        let circuit = breaker.state(&instance.host);
        Self {
            host: instance.host.clone(),
            display_name: instance.display_name.clone(),
            success_rate,
            avg_latency_ms: latency.is_finite().then_some(latency),
            samples: tracker.sample_count(&instance.host),
            circuit_open: circuit.opened_at.is_some(),
            consecutive_failures: circuit.consecutive_failures,
            indicator: HealthIndicator::from_success_rate(success_rate),
            active,
        }
    }

    /// `"name (123ms, 95%)"`, with dashes for unknown values.
    pub fn label(&self) -> String {
        let latency = self
            .avg_latency_ms
            .map(|l| format!("{}ms", l.round()))
            .unwrap_or_else(|| "–".to_string());
        let rate = if self.samples == 0 {
            "–".to_string()
        } else {
            format!("{}%", (self.success_rate * 100.0).round())
        };
        format!("{} ({}, {})", self.display_name, latency, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_display_name_defaults_to_host() {
        let config = InstanceConfig {
            host: "yewtu.be".into(),
            name: None,
        };
        assert_eq!(Instance::from(&config).display_name, "yewtu.be");

        let config = InstanceConfig {
            host: "yewtu.be".into(),
            name: Some("Yewtube".into()),
        };
        assert_eq!(Instance::from(&config).display_name, "Yewtube");
    }

    #[test]
    fn test_indicator_thresholds() {
        assert_eq!(HealthIndicator::from_success_rate(0.9), HealthIndicator::Healthy);
        assert_eq!(HealthIndicator::from_success_rate(0.8), HealthIndicator::Degraded);
        assert_eq!(HealthIndicator::from_success_rate(0.5), HealthIndicator::Degraded);
        assert_eq!(HealthIndicator::from_success_rate(0.4), HealthIndicator::Unhealthy);
    }

    #[tokio::test]
    async fn test_view_capture_and_label() {
        let tracker = PerformanceTracker::default();
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60));
        let instance = Instance::new("a.example", "Alpha");

        let view = InstanceView::capture(&instance, &tracker, &breaker, false);
        assert_eq!(view.avg_latency_ms, None);
        assert_eq!(view.label(), "Alpha (–, –)");

        tracker.add_result("a.example", Some(Duration::from_millis(120)), true);
        tracker.add_result("a.example", None, false);
        breaker.record_failure("a.example");

        let view = InstanceView::capture(&instance, &tracker, &breaker, true);
        assert_eq!(view.success_rate, 0.5);
        assert_eq!(view.consecutive_failures, 1);
        assert!(!view.circuit_open);
        assert!(view.active);
        assert_eq!(view.label(), "Alpha (120ms, 50%)");
    }
}
