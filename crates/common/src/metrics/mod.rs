//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Cartograph metrics
pub const METRICS_PREFIX: &str = "cartograph";

/// Histogram buckets for a whole compile (fan-out to several APIs)
pub const COMPILE_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Compile metrics
    describe_counter!(
        format!("{}_compiles_total", METRICS_PREFIX),
        Unit::Count,
        "Total cartography compiles"
    );

    describe_histogram!(
        format!("{}_compile_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Cartography compile latency in seconds"
    );

    describe_gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        Unit::Count,
        "Nodes in the last compiled graph"
    );

    describe_gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        Unit::Count,
        "Edges in the last compiled graph"
    );

    // Source metrics
    describe_counter!(
        format!("{}_source_calls_total", METRICS_PREFIX),
        Unit::Count,
        "Total calls to external bibliographic sources"
    );

    describe_histogram!(
        format!("{}_source_call_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "External source call latency in seconds"
    );

    describe_counter!(
        format!("{}_degraded_items_total", METRICS_PREFIX),
        Unit::Count,
        "Per-item failures swallowed during compilation"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a finished compile
pub fn record_compile(duration_secs: f64, mode: &str, node_count: usize, edge_count: usize) {
    counter!(
        format!("{}_compiles_total", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_compile_duration_seconds", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .set(node_count as f64);

    gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .set(edge_count as f64);
}

/// Helper to record an external source call
pub fn record_source_call(source: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_source_calls_total", METRICS_PREFIX),
        "source" => source.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_source_call_duration_seconds", METRICS_PREFIX),
        "source" => source.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a per-item failure that was degraded to "no contribution"
pub fn record_degraded(stage: &str) {
    counter!(
        format!("{}_degraded_items_total", METRICS_PREFIX),
        "stage" => stage.to_string()
    )
    .increment(1);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}
