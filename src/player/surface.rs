//! Embed surfaces.
//!
//! A surface is whatever shows the embed page: a browser frame driven over
//! the event stream, or a test double. The player owns timeouts; a surface
//! only reports what the frame did.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::events::{EventBus, RelayEvent};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayError {
    #[error("surface reported a load error")]
    Rejected,

    #[error("surface went away before confirming")]
    Abandoned,

    #[error("display cancelled")]
    Cancelled,
}

/// Identifies one navigation of the surface.
///
/// A generation navigates once per relay attempt and once more for the
/// fallback, so the generation alone does not say which frame a report is
/// about. Keys order by generation, then attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DisplayKey {
    pub generation: u64,
    pub attempt: usize,
}

impl DisplayKey {
    pub fn new(generation: u64, attempt: usize) -> Self {
        Self {
            generation,
            attempt,
        }
    }
}

/// Target for embed navigation.
#[async_trait]
pub trait EmbedSurface: Send + Sync {
    /// Point the surface at `url` and wait for it to confirm or report an
    /// error. Stops waiting once `cancel` fires.
    async fn display(
        &self,
        key: DisplayKey,
        url: &str,
        cancel: CancellationToken,
    ) -> Result<(), DisplayError>;
}

/// Surface living in a remote browser page.
///
/// Navigation goes out as `RelayEvent::Navigate`; the page answers through
/// [`RemoteSurface::confirm`], quoting the generation and attempt it was given.
#[derive(Debug)]
pub struct RemoteSurface {
    events: EventBus,
    pending: DashMap<DisplayKey, oneshot::Sender<bool>>,
}

impl RemoteSurface {
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            pending: DashMap::new(),
        }
    }

    /// Deliver a load report. Returns false when nobody is waiting for
    /// `key`, e.g. because a later attempt or a newer load replaced it.
    pub fn confirm(&self, key: DisplayKey, loaded: bool) -> bool {
        match self.pending.remove(&key) {
            Some((_, tx)) => tx.send(loaded).is_ok(),
            None => {
                tracing::debug!(
                    generation = key.generation,
                    attempt = key.attempt,
                    "Ignoring confirmation for stale display"
                );
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl EmbedSurface for RemoteSurface {
    async fn display(
        &self,
        key: DisplayKey,
        url: &str,
        cancel: CancellationToken,
    ) -> Result<(), DisplayError> {
        let (tx, rx) = oneshot::channel();
        // Earlier navigations are no longer on the frame.
        self.pending.retain(|k, _| *k > key);
        self.pending.insert(key, tx);

        self.events.publish(RelayEvent::Navigate {
            generation: key.generation,
            attempt: key.attempt,
            url: url.to_string(),
        });

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(DisplayError::Cancelled),
            answer = rx => match answer {
                Ok(true) => Ok(()),
                Ok(false) => Err(DisplayError::Rejected),
                Err(_) => Err(DisplayError::Abandoned),
            },
        };

        self.pending.remove_if(&key, |_, tx| tx.is_closed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_navigate_then_confirm() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let surface = Arc::new(RemoteSurface::new(events));

        let task = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .display(DisplayKey::new(4, 1), "https://a/embed/x", CancellationToken::new())
                    .await
            })
        };

        match rx.recv().await.unwrap() {
            RelayEvent::Navigate {
                generation,
                attempt,
                url,
            } => {
                assert_eq!((generation, attempt), (4, 1));
                assert_eq!(url, "https://a/embed/x");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(surface.confirm(DisplayKey::new(4, 1), true));
        assert_eq!(task.await.unwrap(), Ok(()));
        assert_eq!(surface.pending(), 0);
    }

    #[tokio::test]
    async fn test_reported_error() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let surface = Arc::new(RemoteSurface::new(events));

        let task = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .display(DisplayKey::new(1, 1), "u", CancellationToken::new())
                    .await
            })
        };
        rx.recv().await.unwrap();
        surface.confirm(DisplayKey::new(1, 1), false);

        assert_eq!(task.await.unwrap(), Err(DisplayError::Rejected));
    }

    #[tokio::test]
    async fn test_cancel_stops_waiting() {
        let surface = RemoteSurface::new(EventBus::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = surface.display(DisplayKey::new(2, 1), "u", cancel).await;
        assert_eq!(result, Err(DisplayError::Cancelled));
        assert_eq!(surface.pending(), 0);
        assert!(!surface.confirm(DisplayKey::new(2, 1), true));
    }

    #[tokio::test]
    async fn test_report_for_earlier_attempt_is_ignored() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let surface = Arc::new(RemoteSurface::new(events));

        let first = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .display(DisplayKey::new(1, 1), "https://a/embed/x", CancellationToken::new())
                    .await
            })
        };
        rx.recv().await.unwrap();
        let second = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .display(DisplayKey::new(1, 2), "https://b/embed/x", CancellationToken::new())
                    .await
            })
        };
        rx.recv().await.unwrap();

        // The first frame's late error cannot resolve the second display.
        assert!(!surface.confirm(DisplayKey::new(1, 1), false));
        assert_eq!(first.await.unwrap(), Err(DisplayError::Abandoned));
        assert!(surface.confirm(DisplayKey::new(1, 2), true));
        assert_eq!(second.await.unwrap(), Ok(()));
    }
}
