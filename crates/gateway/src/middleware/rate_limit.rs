//! Global rate limiting using the token bucket from governor

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use partlookup_common::errors::AppError;
use partlookup_common::metrics::METRICS_PREFIX;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Shared limiter plus the configured rate reported to clients
#[derive(Clone)]
pub struct GlobalRateLimiter {
    limiter: Arc<DefaultDirectRateLimiter>,
    requests_per_second: u32,
}

impl GlobalRateLimiter {
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Create a limiter. Zero values are raised to one.
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> GlobalRateLimiter {
    let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::per_second(per_second).allow_burst(burst);

    GlobalRateLimiter {
        limiter: Arc::new(RateLimiter::direct(quota)),
        requests_per_second: per_second.get(),
    }
}

/// Reject requests once the bucket is empty
pub async fn rate_limit(
    State(limiter): State<GlobalRateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if limiter.check() {
        return Ok(next.run(request).await);
    }

    tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
    metrics::counter!(format!("{}_rate_limited_total", METRICS_PREFIX)).increment(1);
    Err(AppError::RateLimited {
        limit: limiter.requests_per_second,
    })
}
