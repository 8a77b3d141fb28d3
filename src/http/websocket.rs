//! Event stream over WebSocket.
//!
//! # Data Flow
//! ```text
//! EventBus ──── RelayEvent JSON text frames ────→ browser page
//! ```
//!
//! # Design Decisions
//! - A new subscriber first receives the current ranking
//! - A lagging subscriber skips missed events instead of disconnecting
//! - Client frames are ignored except Close

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::events::RelayEvent;

pub async fn stream_events(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<RelayEvent>,
    initial: RelayEvent,
) {
    if send(&mut socket, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if send(&mut socket, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagging");
                }
                Err(RecvError::Closed) => break,
            },
            frame = socket.recv() => match frame {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("Event stream closed");
}

async fn send(socket: &mut WebSocket, event: &RelayEvent) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode event");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}
