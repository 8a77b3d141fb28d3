//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - Initialising twice is harmless (tests and the CLI both call it)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `default_level` applies to this crate only; dependencies stay at `warn`
/// unless `RUST_LOG` says otherwise.
pub fn init_tracing(default_level: &str) {
    let fallback = format!("warn,relay_failover={default_level},tower_http={default_level}");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
