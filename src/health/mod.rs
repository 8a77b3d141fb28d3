//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active probes (active.rs):
//!     Startup scan, manual request, or periodic timer
//!     → Probe each instance's health endpoint (concurrently)
//!     → tracker.rs sample + resilience::circuit_breaker outcome
//!     → pool::rotator re-rank (background cycles)
//!
//! Real traffic (loader, player):
//!     Every API or embed attempt
//!     → tracker.rs sample + circuit breaker outcome
//! ```
//!
//! # Design Decisions
//! - Probes and real attempts feed the same history
//! - History is per-instance and bounded

pub mod active;
pub mod tracker;

pub use active::{HealthMonitor, ProbeSummary};
pub use tracker::{HealthSample, PerformanceTracker};
