//! A local stand-in for a relay instance.
//!
//! ```text
//! cargo run --example mock_relay -- 127.0.0.1:3001
//! ```
//! Then point an `[[instances]]` entry at `127.0.0.1:3001` with
//! `loader.scheme = "http"`.

use axum::{extract::Path, response::Html, routing::get, Json, Router};
use serde_json::{json, Value};

async fn stats() -> Json<Value> {
    Json(json!({ "software": { "name": "mock-relay" }, "openRegistrations": false }))
}

async fn video(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "title": format!("Mock video {}", id),
        "videoId": id,
        "lengthSeconds": 212,
        "author": "Mock Author",
    }))
}

async fn playlist(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "title": format!("Mock playlist {}", id),
        "videos": [
            { "videoId": "mock1", "title": "First", "lengthSeconds": 61 },
            { "videoId": "mock2", "title": "Second", "lengthSeconds": 3725 },
        ],
    }))
}

async fn embed(Path(id): Path<String>) -> Html<String> {
    Html(format!("<html><body><h1>Playing {}</h1></body></html>", id))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:3001".to_string());

    let app = Router::new()
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/videos/{id}", get(video))
        .route("/api/v1/playlists/{id}", get(playlist))
        .route("/embed/{id}", get(embed));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("Mock relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
