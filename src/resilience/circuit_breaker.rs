//! Per-instance circuit breaker.
//!
//! # States
//! - Closed: instance receives traffic
//! - Open: instance skipped by rotation until the blacklist window elapses
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures reach max_failures
//! Open → Closed: blacklist_duration elapsed since opening (checked lazily)
//! any → Closed: a recorded success
//! ```
//!
//! # Design Decisions
//! - Expiry is evaluated on every query; no timer task
//! - Closing by expiry also resets the failure count
//! - Failures while open do not extend the window

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics;

/// Breaker bookkeeping for one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitState {
    pub consecutive_failures: u32,
    /// Set iff the circuit is open.
    pub opened_at: Option<Instant>,
}

impl CircuitState {
    fn expire(&mut self, now: Instant, blacklist: Duration) -> bool {
        match self.opened_at {
            Some(opened) if now.saturating_duration_since(opened) >= blacklist => {
                self.opened_at = None;
                self.consecutive_failures = 0;
                true
            }
            _ => false,
        }
    }
}

/// Circuit breakers for every instance, keyed by host.
#[derive(Debug)]
pub struct CircuitBreaker {
    max_failures: u32,
    blacklist_duration: Duration,
    circuits: DashMap<String, CircuitState>,
}

impl CircuitBreaker {
    pub fn new(max_failures: u32, blacklist_duration: Duration) -> Self {
        Self {
            max_failures: max_failures.max(1),
            blacklist_duration,
            circuits: DashMap::new(),
        }
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    pub fn blacklist_duration(&self) -> Duration {
        self.blacklist_duration
    }

    /// A success closes the circuit and clears the failure streak.
    pub fn record_success(&self, host: &str) {
        let mut state = self.circuits.entry(host.to_string()).or_default();
        if state.opened_at.is_some() {
            tracing::info!(host = %host, "Circuit closed after success");
        }
        *state = CircuitState::default();
    }

    /// Count a failure; opens the circuit once the streak reaches the threshold.
    pub fn record_failure(&self, host: &str) {
        let now = Instant::now();
        let mut state = self.circuits.entry(host.to_string()).or_default();
        state.expire(now, self.blacklist_duration);

        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        if state.opened_at.is_none() && state.consecutive_failures >= self.max_failures {
            state.opened_at = Some(now);
            tracing::warn!(
                host = %host,
                failures = state.consecutive_failures,
                blacklist_secs = self.blacklist_duration.as_secs(),
                "Circuit opened"
            );
            metrics::record_circuit_opened(host);
        }
    }

    /// Whether the instance is currently blacklisted.
    pub fn is_open(&self, host: &str) -> bool {
        let Some(mut state) = self.circuits.get_mut(host) else {
            return false;
        };
        if state.expire(Instant::now(), self.blacklist_duration) {
            tracing::debug!(host = %host, "Circuit closed after blacklist window");
        }
        state.opened_at.is_some()
    }

    pub fn consecutive_failures(&self, host: &str) -> u32 {
        self.state(host).consecutive_failures
    }

    /// Snapshot of a host's breaker with expiry applied.
    pub fn state(&self, host: &str) -> CircuitState {
        match self.circuits.get_mut(host) {
            Some(mut state) => {
                state.expire(Instant::now(), self.blacklist_duration);
                *state
            }
            None => CircuitState::default(),
        }
    }
}
