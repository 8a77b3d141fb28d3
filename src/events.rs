//! UI-facing event stream.
//!
//! The display collaborator subscribes to these to refresh the instance
//! selector, the active-instance status and toast messages, and to learn
//! which URL to point the embed surface at.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::pool::{Instance, InstanceView};

/// Aggregate outcome of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Relay content is displayed.
    Loaded,
    /// The original provider's embed is displayed.
    Fallback,
    /// Nothing could be displayed.
    AllFailed,
    /// The input was not a video or playlist URL.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// Instance order or stats changed.
    RankingChanged { instances: Vec<InstanceView> },
    /// The rotator cursor moved to another instance.
    ActiveInstanceChanged { instance: Instance },
    /// Point the embed surface at `url`, then confirm with `generation`
    /// and `attempt`.
    Navigate {
        generation: u64,
        attempt: usize,
        url: String,
    },
    /// A load request finished.
    LoadResult {
        generation: u64,
        outcome: LoadOutcome,
        message: String,
    },
}

/// Broadcast fan-out of `RelayEvent`s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RelayEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send to current subscribers. Having none is fine.
    pub fn publish(&self, event: RelayEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
