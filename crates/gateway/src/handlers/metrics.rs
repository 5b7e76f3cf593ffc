//! Prometheus scrape endpoint

use axum::{extract::State, http::header, response::IntoResponse};
use partlookup_common::errors::{AppError, Result};
use crate::AppState;

/// Render metrics in the Prometheus text format
pub async fn render(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or_else(|| AppError::ServiceUnavailable {
        message: "metrics are disabled".to_string(),
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    ))
}
