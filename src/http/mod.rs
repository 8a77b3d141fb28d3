//! HTTP service subsystem.
//!
//! # Data Flow
//! ```text
//! Browser page
//!     → server.rs (Axum router, request ID + trace layers)
//!     → handlers.rs (JSON API over the engine)
//!     → websocket.rs (RelayEvent stream back to the page)
//! ```
//!
//! # Design Decisions
//! - The page is the embed surface: it follows `navigate` events and
//!   confirms each navigation through `/api/embed/{generation}/{attempt}/...`
//! - Only bad input maps to 4xx; pool exhaustion still answers 200 with
//!   a fallback outcome

pub mod handlers;
pub mod request;
pub mod server;
pub mod websocket;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
