//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap relay calls with a deadline
//! - Measure elapsed time for latency samples
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out attempt is reported exactly like an unreachable instance

use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout, Instant};

use crate::relay::{RelayError, RelayResult};

/// Outcome of a timed relay call.
#[derive(Debug)]
pub struct Timed<T> {
    pub result: RelayResult<T>,
    pub elapsed: Duration,
}

/// Run `fut` with a deadline; elapsing converts into `InstanceUnreachable`.
pub async fn with_deadline<T, F>(host: &str, deadline: Duration, fut: F) -> Timed<T>
where
    F: Future<Output = RelayResult<T>>,
{
    let start = Instant::now();
    let result = match timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(RelayError::unreachable(
            host,
            format!("timed out after {}ms", deadline.as_millis()),
        )),
    };
    Timed {
        result,
        elapsed: start.elapsed(),
    }
}
