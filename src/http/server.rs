//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the JSON API and event stream
//! - Wire up middleware (request ID, tracing)
//! - Start the background health monitor alongside the listener
//! - Drain on shutdown

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::{Engine, Shutdown};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

/// HTTP front for a running engine.
pub struct HttpServer {
    router: Router,
    engine: Arc<Engine>,
}

impl HttpServer {
    pub fn new(engine: Arc<Engine>) -> Self {
        let state = AppState {
            engine: engine.clone(),
        };
        Self {
            router: build_router(state),
            engine,
        }
    }

    /// The router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Start the background monitor and serve until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let monitor = self.engine.monitor.start_background(shutdown.subscribe());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown.subscribe()))
            .await?;

        if let Err(e) = monitor.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/status", get(handlers::get_status))
        .route("/instances", get(handlers::get_instances))
        .route("/instances/{host}/select", post(handlers::select_instance))
        .route("/probe", post(handlers::probe))
        .route("/load", post(handlers::load))
        .route("/playlist/{index}/play", post(handlers::play_entry))
        .route("/embed/{generation}/{attempt}/loaded", post(handlers::embed_loaded))
        .route("/embed/{generation}/{attempt}/failed", post(handlers::embed_failed))
        .route("/events", get(handlers::events));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}
