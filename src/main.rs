//! relay-failover
//!
//! Picks healthy relay instances for YouTube-compatible embeds and fails
//! over between them.
//!
//! # Architecture Overview
//!
//! ```text
//!   browser page ──HTTP/WS──▶ http ──▶ player ──▶ loader ──▶ relay client ──▶ instances
//!                                        │          │
//!                                        ▼          ▼
//!                                   embed surface  pool (rotator)
//!                                                   ▲      ▲
//!                                    health monitor ┘      │
//!                                 tracker + circuit breaker┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use relay_failover::config::{load_config, validate_config, ConfigError, RelayConfig};
use relay_failover::http::HttpServer;
use relay_failover::lifecycle::{Engine, Shutdown, StartupError};
use relay_failover::loader::EmbedUrls;
use relay_failover::observability::{logging, metrics};
use relay_failover::relay::{LoadTarget, RelayError};

#[derive(Parser)]
#[command(name = "relay-failover", version, about = "Relay instance health and failover engine")]
struct Cli {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan instances, then serve the HTTP API (default)
    Serve,
    /// Probe every instance once and print the ranking
    Probe,
    /// Resolve a video or playlist URL through the pool
    Load { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = read_config(cli.config.as_deref())?;
    logging::init_tracing(&config.observability.log_level);

    tracing::info!(
        instances = config.instances.len(),
        bind_address = %config.listener.bind_address,
        "relay-failover v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await?,
        Command::Probe => probe(config).await?,
        Command::Load { url } => load(config, &url).await?,
    }
    Ok(())
}

fn read_config(path: Option<&std::path::Path>) -> Result<RelayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = RelayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

async fn serve(config: RelayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let bind_address = config.listener.bind_address.clone();
    let engine = Arc::new(Engine::build(config)?);
    engine.initial_scan().await;

    let listener = TcpListener::bind(&bind_address).await?;
    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
            }
            shutdown.trigger();
        });
    }

    HttpServer::new(engine).run(listener, &shutdown).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn probe(config: RelayConfig) -> Result<(), StartupError> {
    let engine = Engine::build(config)?;
    engine.initial_scan().await;

    for view in engine.rotator.snapshot() {
        let marker = if view.active { "*" } else { " " };
        let circuit = if view.circuit_open { "blacklisted" } else { "" };
        println!("{} {:<40} {:?} {}", marker, view.label(), view.indicator, circuit);
    }
    Ok(())
}

async fn load(config: RelayConfig, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let urls = EmbedUrls::new(&config.loader.scheme, &config.embed);
    let engine = Engine::build(config)?;
    let target = LoadTarget::parse(url);
    if !target.is_valid() {
        return Err(RelayError::InvalidInput(url.to_string()).into());
    }

    engine.initial_scan().await;
    match engine.loader.load(&target).await {
        Ok(loaded) => {
            let playlist = match &target {
                LoadTarget::Playlist { playlist_id } => Some(playlist_id.as_str()),
                _ => None,
            };
            let video = loaded.data.first_video_id().or(target.id()).unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&loaded)?);
            println!("embed: {}", urls.relay(&loaded.instance.host, video, playlist));
        }
        Err(err @ RelayError::AllInstancesFailed { .. }) => {
            eprintln!("{}", err);
            if let Some(fallback) = urls.fallback(&target, None) {
                println!("fallback: {}", fallback);
            }
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
