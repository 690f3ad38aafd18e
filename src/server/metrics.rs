use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::library_store::LibraryCounts;

/// Metric name prefix for all music library metrics
const PREFIX: &str = "music_library";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Verse chain mutations by operation and outcome (ok or ChainError kind)
    pub static ref CHAIN_MUTATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_chain_mutations_total"), "Verse chain mutations"),
        &["operation", "outcome"]
    ).expect("Failed to create chain_mutations_total metric");

    pub static ref METADATA_FETCH_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_metadata_fetch_duration_seconds"),
            "Song metadata fetch duration in seconds"
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["status"]
    ).expect("Failed to create metadata_fetch_duration_seconds metric");

    // Library Metrics
    pub static ref LIBRARY_ITEMS_TOTAL: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_items_total"), "Total items in the library"),
        &["type"]
    ).expect("Failed to create items_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered is fine (tests call this repeatedly)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CHAIN_MUTATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(METADATA_FETCH_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(LIBRARY_ITEMS_TOTAL.clone()));
}

pub fn set_library_counts(counts: &LibraryCounts) {
    LIBRARY_ITEMS_TOTAL
        .with_label_values(&["song"])
        .set(counts.songs as f64);
    LIBRARY_ITEMS_TOTAL
        .with_label_values(&["group"])
        .set(counts.groups as f64);
    LIBRARY_ITEMS_TOTAL
        .with_label_values(&["verse"])
        .set(counts.verses as f64);
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_chain_mutation(operation: &str, outcome: &str) {
    CHAIN_MUTATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_metadata_fetch(status: &str, duration: Duration) {
    METADATA_FETCH_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
