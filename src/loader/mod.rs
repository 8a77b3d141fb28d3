//! Content loading through the relay pool.
//!
//! # Data Flow
//! ```text
//! LoadTarget
//!     → resource.rs
//!         rotator.get_healthy_instance()
//!         → relay::RelayApi call under a per-attempt deadline
//!         → payload validation
//!         → on failure: tracker + rotator.fail_instance_and_rotate(), pause, next
//!     → Loaded { instance, data } | AllInstancesFailed
//!     → embed.rs (relay embed URL, or fallback URL on exhaustion)
//! ```

pub mod embed;
pub mod resource;

pub use embed::EmbedUrls;
pub use resource::{Loaded, ResourceLoader};
