//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devserver_requests_total` (counter): requests by method, status, outcome
//!   (`static`, `serve`, `fallback` or `rejected`)
//! - `devserver_request_duration_seconds` (histogram): latency distribution
//! - `devserver_resolutions_total` (counter): classifications by outcome and rule
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus exporter is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one served request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "devserver_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("devserver_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one path classification. `rule` is `None` for the default fallback.
pub fn record_resolution(outcome: &'static str, rule: Option<&str>) {
    counter!(
        "devserver_resolutions_total",
        "outcome" => outcome,
        "rule" => rule.unwrap_or("default").to_string()
    )
    .increment(1);
}
