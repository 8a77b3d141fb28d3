//! Relay instance pool.
//!
//! # Data Flow
//! ```text
//! Config instances (priority order)
//!     → instance.rs (immutable identity)
//!     → rotator.rs (ranked order + cursor)
//!         - rank(): health::tracker stats
//!         - get_healthy_instance() / fail_and_rotate(): resilience::circuit_breaker
//!     → Instance handed to the loader or player
//! ```
//!
//! # Design Decisions
//! - An empty pool is a startup error, never a runtime condition
//! - Blacklisted instances are skipped, but rotation always yields something

use thiserror::Error;

pub mod instance;
pub mod rotator;

pub use instance::{HealthIndicator, Instance, InstanceView};
pub use rotator::InstanceRotator;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("instance pool is empty")]
    Empty,
}
