//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_probes_total` (counter): health probes by host, outcome
//! - `relay_probe_duration_seconds` (histogram): probe latency by host
//! - `relay_attempts_total` (counter): API and embed attempts by host, outcome
//! - `relay_loads_total` (counter): load requests by aggregate outcome
//! - `relay_instance_success_rate` (gauge): rolling success rate by host
//! - `relay_circuit_opened_total` (counter): circuit openings by host
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Labels are instance hosts; the pool is small and fixed

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on `addr` and describe all metrics.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!("relay_probes_total", "Health probes sent to relay instances");
    describe_histogram!(
        "relay_probe_duration_seconds",
        "Health probe latency in seconds"
    );
    describe_counter!(
        "relay_attempts_total",
        "API and embed attempts against relay instances"
    );
    describe_counter!("relay_loads_total", "Load requests by outcome");
    describe_gauge!(
        "relay_instance_success_rate",
        "Rolling success rate per relay instance"
    );
    describe_counter!(
        "relay_circuit_opened_total",
        "Times an instance was blacklisted"
    );
}

#[inline]
pub fn record_probe(host: &str, success: bool, latency: Option<Duration>) {
    let labels = [
        ("host", host.to_string()),
        ("outcome", if success { "ok" } else { "error" }.to_string()),
    ];
    counter!("relay_probes_total", &labels).increment(1);
    if let Some(latency) = latency {
        histogram!("relay_probe_duration_seconds", "host" => host.to_string())
            .record(latency.as_secs_f64());
    }
}

/// `outcome` is `ok` or a `RelayError::kind()`.
#[inline]
pub fn record_attempt(host: &str, outcome: &'static str) {
    let labels = [("host", host.to_string()), ("outcome", outcome.to_string())];
    counter!("relay_attempts_total", &labels).increment(1);
}

#[inline]
pub fn record_load_result(outcome: &'static str) {
    counter!("relay_loads_total", "outcome" => outcome).increment(1);
}

#[inline]
pub fn record_instance_success_rate(host: &str, rate: f64) {
    gauge!("relay_instance_success_rate", "host" => host.to_string()).set(rate);
}

#[inline]
pub fn record_circuit_opened(host: &str) {
    counter!("relay_circuit_opened_total", "host" => host.to_string()).increment(1);
}
