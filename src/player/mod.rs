//! Embed display with failover.
//!
//! # Data Flow
//! ```text
//! pasted URL
//!     → session.rs Player::play (new generation, previous one cancelled)
//!     → loader::ResourceLoader::load
//!     → surface.rs EmbedSurface::display (bounded by the embed timeout)
//!         on failure: record, rotate, display on the next instance
//!     → fallback embed once the pool is exhausted
//!     → RelayEvent::LoadResult (current generation only)
//! ```

pub mod session;
pub mod surface;

pub use session::{NowPlaying, PlayOutcome, Player};
pub use surface::{DisplayError, DisplayKey, EmbedSurface, RemoteSurface};
