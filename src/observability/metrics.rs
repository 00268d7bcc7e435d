//! Metrics collection and exposition.
//!
//! # Metrics
//! - `requests_total` (counter): requests by route, status
//! - `request_duration_seconds` (histogram): latency by route
//! - `hello_outcomes_total` (counter): `/hello` terminal states by outcome

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_hello_outcome(outcome: &'static str) {
    metrics::counter!("hello_outcomes_total", "outcome" => outcome).increment(1);
}

/// Metric label for a request: its matched route, or `unmatched` when the
/// router fell through to the 404 fallback.
pub fn route_label<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned())
}

/// Router-wide middleware recording count and latency per route.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = route_label(&request);

    let response = next.run(request).await;
    record_request(&route, response.status().as_u16(), start);
    response
}
