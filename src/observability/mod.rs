//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! health, resilience, pool, loader, player:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
