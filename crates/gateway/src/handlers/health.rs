//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub catalog: CatalogCheck,
}

#[derive(Serialize)]
pub struct CatalogCheck {
    pub loaded: bool,
    pub generation: u64,
    pub total_count: usize,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness probe - "loading" until the startup catalog load finishes
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let stats = state.engine.stats();

    Json(ReadyResponse {
        status: if stats.loaded { "ready" } else { "loading" }.to_string(),
        checks: HealthChecks {
            catalog: CatalogCheck {
                loaded: stats.loaded,
                generation: stats.generation,
                total_count: stats.total_count,
            },
        },
    })
}
