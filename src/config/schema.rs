//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay
//! front end. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay instances, in initial priority order.
    pub instances: Vec<InstanceConfig>,

    /// Health probe settings.
    pub health_check: HealthCheckConfig,

    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Relay API call settings.
    pub loader: LoaderConfig,

    /// Embed surface settings.
    pub embed: EmbedConfig,

    /// Listener configuration for the local API.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            health_check: HealthCheckConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            loader: LoaderConfig::default(),
            embed: EmbedConfig::default(),
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_instances() -> Vec<InstanceConfig> {
    [
        "yewtu.be",
        "invidious.nerdvpn.de",
        "invidious.flokinet.to",
        "invidious.privacydev.net",
        "iv.melmac.space",
        "inv1.nadeko.net",
        "inv2.nadeko.net",
        "inv3.nadeko.net",
        "invidious.f5.si",
    ]
    .into_iter()
    .map(|host| InstanceConfig {
        host: host.to_string(),
        name: None,
    })
    .collect()
}

/// A single relay instance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Hostname (optionally with port), e.g. "yewtu.be".
    pub host: String,

    /// Display name. Defaults to the host.
    #[serde(default)]
    pub name: Option<String>,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the recurring background probe.
    pub enabled: bool,

    /// Path to probe on every instance.
    pub path: String,

    /// Background probe interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Samples kept per instance.
    pub history_window: usize,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/api/v1/stats".to_string(),
            interval_secs: 60,
            timeout_ms: 5000,
            history_window: 20,
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub max_failures: u32,

    /// How long an opened circuit stays open, in seconds.
    pub blacklist_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            blacklist_secs: 300,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn blacklist_duration(&self) -> Duration {
        Duration::from_secs(self.blacklist_secs)
    }
}

/// Relay API call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// URL scheme used to reach instances ("https" in production).
    pub scheme: String,

    /// Timeout for a single API attempt in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            attempt_timeout_ms: 10_000,
            retry_delay_ms: 1000,
        }
    }
}

impl LoaderConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Embed surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// How long the surface has to confirm a load, in milliseconds.
    pub timeout_ms: u64,

    /// Append `autoplay=1` to relay embed URLs.
    pub autoplay: bool,

    /// Optional `quality` parameter for relay embed URLs.
    pub quality: Option<String>,

    /// Origin of the original provider, used for fallback embeds.
    pub fallback_base: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8000,
            autoplay: true,
            quality: None,
            fallback_base: "https://www.youtube.com".to_string(),
        }
    }
}

impl EmbedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
