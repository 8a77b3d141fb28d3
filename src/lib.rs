//! Relay instance health and failover engine.
//!
//! Tracks the latency and reliability of a pool of relay instances, ranks
//! them, blacklists failing ones for a cooldown, and loads content through
//! whichever instance works, falling back to the original provider when
//! none do.

// Core subsystems
pub mod config;
pub mod relay;

// Pool management
pub mod health;
pub mod pool;

// Content loading
pub mod loader;
pub mod player;

// Service surface
pub mod events;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::{Engine, Shutdown};
