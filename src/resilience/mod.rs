//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a relay instance:
//!     → timeouts.rs (enforce per-attempt deadline, measure latency)
//!     → On failure: circuit_breaker.rs (track streak, open circuit at threshold)
//!     → pool::rotator skips open circuits when choosing the next instance
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Circuit breaker prevents hammering a known-bad instance
//! - Retry bounds live in the loader as an explicit attempt counter

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use timeouts::{with_deadline, Timed};
