//! Catalog statistics

use axum::{extract::State, Json};
use partlookup_common::CatalogStats;
use crate::AppState;

/// Record counts per origin plus load state
pub async fn stats(State(state): State<AppState>) -> Json<CatalogStats> {
    Json(state.engine.stats())
}
