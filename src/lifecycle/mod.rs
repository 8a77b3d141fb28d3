//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build engine → Initial probe scan + rank
//!     → Start background monitor → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Trigger broadcast → Monitor loop exits, listener drains → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Every long-running task subscribes to the same shutdown broadcast

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Engine, StartupError};
