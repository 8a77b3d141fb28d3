//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use relay_failover::config::{InstanceConfig, RelayConfig};

/// A mock relay instance answering `(status, body)` per request path.
pub struct MockRelay {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockRelay {
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a programmable mock relay on an ephemeral port.
pub async fn start_mock_relay<F>(handler: F) -> MockRelay
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(handler);

    {
        let hits = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let handler = handler.clone();
                let hits = hits.clone();
                tokio::spawn(async move {
                    let Some(path) = read_request_path(&mut socket).await else {
                        return;
                    };
                    hits.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = handler(&path);
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason(status),
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                });
            }
        });
    }

    MockRelay { addr, hits }
}

/// A relay that serves `video_id` and playlist `PL123` with two entries.
pub async fn start_healthy_relay() -> MockRelay {
    start_mock_relay(|path| {
        if path.starts_with("/api/v1/videos/") {
            let id = path.trim_start_matches("/api/v1/videos/");
            (200, video_json(id, "A video"))
        } else if path.starts_with("/api/v1/playlists/") {
            (200, playlist_json(&["v1", "v2"]))
        } else {
            (200, "{}".to_string())
        }
    })
    .await
}

/// An address nothing listens on.
pub async fn dead_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

pub fn video_json(id: &str, title: &str) -> String {
    serde_json::json!({
        "title": title,
        "videoId": id,
        "lengthSeconds": 212,
        "author": "Someone",
    })
    .to_string()
}

pub fn playlist_json(ids: &[&str]) -> String {
    let videos: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({ "videoId": id, "title": format!("Video {}", id), "lengthSeconds": 61 }))
        .collect();
    serde_json::json!({ "title": "A playlist", "videos": videos }).to_string()
}

/// Config over `hosts` tuned for fast tests: plain HTTP, short delays.
pub fn test_config(hosts: &[String]) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.instances = hosts
        .iter()
        .map(|h| InstanceConfig {
            host: h.clone(),
            name: None,
        })
        .collect();
    config.loader.scheme = "http".into();
    config.loader.retry_delay_ms = 20;
    config.loader.attempt_timeout_ms = 2_000;
    config.health_check.timeout_ms = 1_000;
    config.health_check.enabled = false;
    config.embed.timeout_ms = 500;
    config.embed.autoplay = false;
    config
}

async fn read_request_path(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Engine over real HTTP that ignores any proxy settings in the environment.
pub fn engine(config: RelayConfig) -> relay_failover::lifecycle::Engine {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let api = relay_failover::relay::HttpRelayClient::with_client(
        client,
        &config.loader.scheme,
        &config.health_check.path,
    );
    relay_failover::lifecycle::Engine::with_api(config, Arc::new(api)).unwrap()
}
