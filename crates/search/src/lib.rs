//! PartLookup Query Engine
//!
//! Searches the catalog snapshot published by the catalog store:
//! - Query classification (code vs description)
//! - Case-insensitive substring filtering per origin
//! - Priority merge with code deduplication
//! - Optional relevance tiers inside each priority group
//! - Figure-to-image resolution

pub mod classify;
pub mod engine;
pub mod ranking;

pub use classify::{classify, ClassifiedQuery, QueryKind};
pub use engine::{search_snapshot, QueryEngine, SearchOptions};
