//! Per-request metrics

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use partlookup_common::metrics::RequestMetrics;

const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Record count and latency per matched route
pub async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ENDPOINT, |path| path.as_str())
        .to_string();
    let tracker = RequestMetrics::start(request.method().as_str(), &endpoint);

    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());
    response
}
