use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Client for a running relay-failover service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Service status and active instance
    Status,
    /// Instance ranking with health stats
    Instances,
    /// Probe every instance now and re-rank
    Probe,
    /// Make HOST the active instance
    Select { host: String },
    /// Load a video or playlist URL
    Load { target: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/api/status", base)),
        Commands::Instances => client.get(format!("{}/api/instances", base)),
        Commands::Probe => client.post(format!("{}/api/probe", base)),
        Commands::Select { host } => client.post(format!("{}/api/instances/{}/select", base, host)),
        Commands::Load { target } => client
            .post(format!("{}/api/load", base))
            .json(&json!({ "url": target })),
    };
    let res = request.send().await?;

    match cli.command {
        Commands::Instances | Commands::Select { .. } => print_instances(res).await,
        _ => print_response(res).await,
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let Some(json) = read_json(res).await? else {
        return Ok(());
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_instances(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let Some(json) = read_json(res).await? else {
        return Ok(());
    };
    let rows = json.as_array().cloned().unwrap_or_default();
    for row in rows {
        let marker = if row["active"].as_bool() == Some(true) { "*" } else { " " };
        let latency = row["avg_latency_ms"]
            .as_f64()
            .map(|l| format!("{:.0}ms", l))
            .unwrap_or_else(|| "-".to_string());
        let rate = row["success_rate"].as_f64().unwrap_or(0.0) * 100.0;
        let circuit = if row["circuit_open"].as_bool() == Some(true) { "open" } else { "closed" };
        println!(
            "{} {:<28} {:>8} {:>5.0}% {:<9} {}",
            marker,
            row["host"].as_str().unwrap_or("?"),
            latency,
            rate,
            row["indicator"].as_str().unwrap_or("?"),
            circuit,
        );
    }
    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }
    Ok(Some(res.json().await?))
}
