//! Metrics and observability utilities
//!
//! Metric descriptions and recording helpers on top of the `metrics` facade.
//! The exporter is installed by whichever binary serves them.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all PartLookup metrics
pub const METRICS_PREFIX: &str = "partlookup";

/// Histogram buckets for request and search latency (in seconds).
/// Catalog searches are in-memory scans, so the low end is dense.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.0001, // 100us
    0.0005, // 500us
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
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

    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of catalog searches"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Catalog search latency in seconds"
    );

    describe_gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of results returned by the last search"
    );

    // Catalog metrics
    describe_gauge!(
        format!("{}_catalog_records", METRICS_PREFIX),
        Unit::Count,
        "Records in the published catalog snapshot, per origin"
    );

    describe_gauge!(
        format!("{}_catalog_images", METRICS_PREFIX),
        Unit::Count,
        "Entries in the image-resolution table"
    );

    // Ingestion metrics
    describe_counter!(
        format!("{}_ingested_records_total", METRICS_PREFIX),
        Unit::Count,
        "Records accepted into the catalog"
    );

    describe_counter!(
        format!("{}_rejected_records_total", METRICS_PREFIX),
        Unit::Count,
        "Records dropped during normalization"
    );

    describe_counter!(
        format!("{}_failed_batches_total", METRICS_PREFIX),
        Unit::Count,
        "Ingestion batches rejected without touching the catalog"
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

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, kind: &str, result_count: usize) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .set(result_count as f64);
}

/// Helper to record the size of a freshly published snapshot
pub fn record_catalog_size(structured: usize, documents: usize, images: usize) {
    gauge!(
        format!("{}_catalog_records", METRICS_PREFIX),
        "origin" => "structured"
    )
    .set(structured as f64);

    gauge!(
        format!("{}_catalog_records", METRICS_PREFIX),
        "origin" => "document"
    )
    .set(documents as f64);

    gauge!(format!("{}_catalog_images", METRICS_PREFIX)).set(images as f64);
}

/// Helper to record the outcome of an ingestion batch
pub fn record_ingestion(origin: &str, accepted: usize, rejected: usize) {
    if accepted == 0 {
        counter!(
            format!("{}_failed_batches_total", METRICS_PREFIX),
            "origin" => origin.to_string()
        )
        .increment(1);
    }

    counter!(
        format!("{}_ingested_records_total", METRICS_PREFIX),
        "origin" => origin.to_string()
    )
    .increment(accepted as u64);

    counter!(
        format!("{}_rejected_records_total", METRICS_PREFIX),
        "origin" => origin.to_string()
    )
    .increment(rejected as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every helper is a no-op
        let metrics = RequestMetrics::start("POST", "/v1/search");
        metrics.finish(200);
        record_search(0.0002, "code", 3);
        record_catalog_size(10, 4, 2);
        record_ingestion("structured", 0, 5);
    }
}
