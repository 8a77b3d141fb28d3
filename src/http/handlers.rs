//! JSON API handlers.

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::events::RelayEvent;
use crate::health::ProbeSummary;
use crate::http::server::AppState;
use crate::http::websocket::stream_events;
use crate::player::{DisplayKey, NowPlaying, PlayOutcome};
use crate::pool::{Instance, InstanceView};
use crate::relay::RelayError;

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let status = match &err {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub active: Instance,
    pub instances: usize,
    pub available: usize,
    pub generation: u64,
    pub now_playing: Option<NowPlaying>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let engine = &state.engine;
    let views = engine.rotator.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        active: engine.rotator.current(),
        instances: views.len(),
        available: views.iter().filter(|v| !v.circuit_open).count(),
        generation: engine.player.generation(),
        now_playing: engine.player.now_playing().map(|n| (*n).clone()),
    })
}

pub async fn get_instances(State(state): State<AppState>) -> Json<Vec<InstanceView>> {
    Json(state.engine.rotator.snapshot())
}

pub async fn select_instance(
    State(state): State<AppState>,
    Path(host): Path<String>,
) -> Result<Json<Vec<InstanceView>>, ApiError> {
    if !state.engine.rotator.select(&host) {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("unknown instance '{}'", host),
        ));
    }
    tracing::info!(host = %host, "Instance selected manually");
    Ok(Json(state.engine.rotator.snapshot()))
}

pub async fn probe(State(state): State<AppState>) -> Json<ProbeSummary> {
    let summary = state.engine.monitor.probe_all().await;
    state.engine.rotator.rank();
    Json(summary)
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub url: String,
}

pub async fn load(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<PlayOutcome>, ApiError> {
    let outcome = state.engine.player.play(&request.url).await?;
    Ok(Json(outcome))
}

pub async fn play_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<PlayOutcome>, ApiError> {
    let outcome = state.engine.player.play_entry(index).await?;
    Ok(Json(outcome))
}

#[derive(Serialize)]
pub struct Confirmation {
    #[serde(flatten)]
    pub key: DisplayKey,
    pub accepted: bool,
}

pub async fn embed_loaded(
    State(state): State<AppState>,
    Path((generation, attempt)): Path<(u64, usize)>,
) -> Json<Confirmation> {
    confirm(&state, DisplayKey::new(generation, attempt), true)
}

pub async fn embed_failed(
    State(state): State<AppState>,
    Path((generation, attempt)): Path<(u64, usize)>,
) -> Json<Confirmation> {
    confirm(&state, DisplayKey::new(generation, attempt), false)
}

fn confirm(state: &AppState, key: DisplayKey, loaded: bool) -> Json<Confirmation> {
    let accepted = state.engine.surface.confirm(key, loaded);
    Json(Confirmation { key, accepted })
}

pub async fn events(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let engine = Arc::clone(&state.engine);
    let rx = engine.events.subscribe();
    let initial = RelayEvent::RankingChanged {
        instances: engine.rotator.snapshot(),
    };
    ws.on_upgrade(move |socket| stream_events(socket, rx, initial))
}
