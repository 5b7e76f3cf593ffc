//! Query Engine
//!
//! Runs a query against the current catalog snapshot:
//! 1. classify the query (code vs description)
//! 2. filter each enabled origin by substring containment
//! 3. bucket matches into priority groups, optionally ranking inside each
//! 4. deduplicate by code and truncate
//! 5. resolve figure references into image paths
//!
//! Searches never fail. Unloaded catalogs, blank queries and filters with
//! every origin switched off all produce an empty result list.

use crate::classify::{ClassifiedQuery, QueryKind};
use crate::ranking::{rank_by_relevance, PriorityGroups};
use partlookup_common::config::{RankingPolicy, SearchConfig};
use partlookup_common::{
    metrics, CatalogSnapshot, CatalogStats, CatalogStore, Origin, PartRecord, SearchResult,
    SourceFilter, DEFAULT_MAX_RESULTS,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Hard cap on returned results
    pub max_results: usize,
    pub ranking: RankingPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            ranking: RankingPolicy::default(),
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            ranking: config.ranking,
        }
    }
}

/// Read-only search front-end over a [`CatalogStore`]
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<CatalogStore>,
    options: SearchOptions,
}

impl QueryEngine {
    pub fn new(store: Arc<CatalogStore>, options: SearchOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Whether the startup load (or any later write) has completed
    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn stats(&self) -> CatalogStats {
        self.store.stats()
    }

    /// Search with automatic query classification
    pub fn search(&self, query: &str, filter: SourceFilter) -> Vec<SearchResult> {
        match ClassifiedQuery::parse(query) {
            Some(classified) => self.run(&classified, filter),
            None => Vec::new(),
        }
    }

    /// Search a specific field, bypassing classification
    pub fn search_as(&self, query: &str, kind: QueryKind, filter: SourceFilter) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.run(&ClassifiedQuery::with_kind(query, kind), filter)
    }

    fn run(&self, query: &ClassifiedQuery, filter: SourceFilter) -> Vec<SearchResult> {
        let start = Instant::now();
        let snapshot = self.store.snapshot();

        if !snapshot.is_loaded() {
            debug!(query = query.needle(), "Catalog not loaded yet, returning no results");
            return Vec::new();
        }

        let results = search_snapshot(&snapshot, query, filter, self.options);

        metrics::record_search(start.elapsed().as_secs_f64(), query.kind.as_str(), results.len());
        debug!(
            query = query.needle(),
            kind = %query.kind,
            generation = snapshot.generation(),
            results = results.len(),
            "Search completed"
        );
        results
    }
}

/// Pure search over one snapshot
pub fn search_snapshot(
    snapshot: &CatalogSnapshot,
    query: &ClassifiedQuery,
    filter: SourceFilter,
    options: SearchOptions,
) -> Vec<SearchResult> {
    if filter.enabled_count() == 0 || options.max_results == 0 {
        return Vec::new();
    }

    let mut groups = PriorityGroups::default();
    for origin in Origin::ALL {
        if !filter.includes(origin) {
            continue;
        }
        for record in snapshot.records(origin) {
            if query.matches(record) {
                groups.push(record);
            }
        }
    }

    if groups.is_empty() {
        return Vec::new();
    }

    if should_rank(options.ranking, filter) {
        groups.reorder_each(|group| rank_by_relevance(query, group));
    }

    groups
        .into_deduplicated(options.max_results)
        .into_iter()
        .map(|record| SearchResult::from_record(record, resolve_image(snapshot, record)))
        .collect()
}

fn should_rank(policy: RankingPolicy, filter: SourceFilter) -> bool {
    match policy {
        RankingPolicy::Stable => false,
        RankingPolicy::SingleOrigin => filter.enabled_count() == 1,
        RankingPolicy::Always => true,
    }
}

/// Image path for a document record's figure, if the index has one
fn resolve_image(snapshot: &CatalogSnapshot, record: &PartRecord) -> Option<String> {
    if record.origin != Origin::Document {
        return None;
    }
    let figure = record.figure_ref.as_deref()?;
    snapshot
        .images()
        .resolve(&record.source_label, figure)
        .map(|asset| asset.path.clone())
}
