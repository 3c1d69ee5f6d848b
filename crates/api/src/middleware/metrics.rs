//! Request metrics middleware

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use critiq_common::metrics::RequestMetrics;

/// Record a counter and latency histogram per request, labeled by the
/// matched route pattern rather than the raw path
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let tracker = RequestMetrics::start(request.method().as_str(), &path);
    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());

    response
}
