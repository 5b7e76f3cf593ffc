//! Search handlers

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use validator::Validate;

use crate::AppState;
use partlookup_common::{
    errors::{AppError, Result},
    SearchResult, SourceFilter,
};
use partlookup_search::{classify, QueryKind};

/// Longest accepted query, in characters
pub const MAX_QUERY_LEN: u64 = 500;

/// Search request
#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = MAX_QUERY_LEN))]
    pub query: String,

    /// Origins to include (both by default)
    #[serde(default)]
    pub filter: SourceFilter,

    /// Match against this field instead of classifying the query
    #[serde(default)]
    pub kind: Option<QueryKind>,
}

/// Query-string form of [`SearchRequest`]
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub structured: Option<bool>,
    pub document: Option<bool>,
    pub kind: Option<QueryKind>,
}

impl From<SearchParams> for SearchRequest {
    fn from(params: SearchParams) -> Self {
        Self {
            query: params.q,
            filter: SourceFilter {
                structured: params.structured.unwrap_or(true),
                document: params.document.unwrap_or(true),
            },
            kind: params.kind,
        }
    }
}

/// Search response
#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// Field the query was matched against, absent for blank queries
    pub kind: Option<QueryKind>,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
    pub processing_time_ms: u64,
}

/// Perform a search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    run_search(&state, request)
}

/// Perform a search from query-string parameters
pub async fn search_query(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    run_search(&state, params.into())
}

fn run_search(state: &AppState, request: SearchRequest) -> Result<Json<SearchResponse>> {
    let start = Instant::now();

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("query".to_string()),
    })?;

    let kind = match request.kind {
        Some(forced) => classify(&request.query).map(|_| forced),
        None => classify(&request.query),
    };
    let results = match request.kind {
        Some(forced) => state.engine.search_as(&request.query, forced, request.filter),
        None => state.engine.search(&request.query, request.filter),
    };

    let processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        query_len = request.query.len(),
        kind = ?kind,
        structured = request.filter.structured,
        document = request.filter.document,
        results = results.len(),
        latency_ms = processing_time_ms,
        "Search completed"
    );

    Ok(Json(SearchResponse {
        query: request.query,
        kind,
        total_results: results.len(),
        results,
        processing_time_ms,
    }))
}
