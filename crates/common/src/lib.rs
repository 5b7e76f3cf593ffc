//! PartLookup Common Library
//!
//! Shared code for all PartLookup crates including:
//! - Part record, image and search result models
//! - The catalog store and its snapshots
//! - Error types and handling
//! - Configuration management
//! - Metrics and tracing setup

pub mod catalog;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod telemetry;

// Re-export commonly used types
pub use catalog::{CatalogSnapshot, CatalogStats, CatalogStore};
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use models::{ImageAsset, ImageIndex, ImageKey, Origin, PartRecord, SearchResult, SourceFilter};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default cap on search results
pub const DEFAULT_MAX_RESULTS: usize = 100;
