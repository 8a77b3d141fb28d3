//! Relay instance integration.
//!
//! # Data Flow
//! ```text
//! LoadTarget (parsed URL)
//!     → client.rs (GET /api/v1/videos/{id} or /api/v1/playlists/{id})
//!     → types.rs (payload shape validation)
//!     → RelayData or RelayError
//! ```
//!
//! # Design Decisions
//! - `RelayApi` is the seam between the failover engine and the network
//! - Non-2xx, transport errors and timeouts are all "unreachable"
//! - A decodable but empty payload is "malformed" and rotates like a network error

pub mod client;
pub mod target;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpRelayClient, RelayApi};
pub use target::LoadTarget;
pub use types::{PlaylistDetails, PlaylistEntry, RelayData, RelayError, RelayResult, VideoDetails};
