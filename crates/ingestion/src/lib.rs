//! PartLookup Ingestion
//!
//! Everything that turns source files into catalog records:
//! - spreadsheet exports (CSV or JSON rows) with column detection
//! - PDF manuals, parsed line by line into document records
//! - image mappings for figure lookups
//! - validated all-or-nothing batches written to the catalog store

pub mod document;
pub mod errors;
pub mod formats;
pub mod pdf;
pub mod processor;
pub mod sources;
pub mod spreadsheet;

pub use document::{DocumentLineParser, LineLimits};
pub use errors::IngestionError;
pub use formats::{ImageMapping, ProcessedDocuments};
pub use processor::{BatchIngestor, DocumentProcessor, IngestReport, WriteMode};
pub use sources::{load_catalog, CatalogLoadReport, CatalogSource};
