//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Critiq metrics
pub const METRICS_PREFIX: &str = "critiq";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
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

    // Signup flow metrics
    describe_counter!(
        format!("{}_signups_total", METRICS_PREFIX),
        Unit::Count,
        "Total signup requests that issued a confirmation code"
    );

    describe_counter!(
        format!("{}_tokens_issued_total", METRICS_PREFIX),
        Unit::Count,
        "Total access tokens issued"
    );

    // Content metrics
    describe_counter!(
        format!("{}_reviews_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviews created"
    );

    describe_counter!(
        format!("{}_comments_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total comments created"
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

/// Record a signup that issued a confirmation code
pub fn record_signup() {
    counter!(format!("{}_signups_total", METRICS_PREFIX)).increment(1);
}

/// Record an access token issuance
pub fn record_token_issued() {
    counter!(format!("{}_tokens_issued_total", METRICS_PREFIX)).increment(1);
}

/// Record a review creation
pub fn record_review_created() {
    counter!(format!("{}_reviews_created_total", METRICS_PREFIX)).increment(1);
}

/// Record a comment creation
pub fn record_comment_created() {
    counter!(format!("{}_comments_created_total", METRICS_PREFIX)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_are_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/api/v1/titles");
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
