//! Catalog sources read at startup
//!
//! Each configured file is a [`CatalogSource`]. Sources are read
//! independently; a missing or malformed file is logged and leaves its part of
//! the catalog empty, and the catalog is marked loaded either way.

use crate::errors::IngestionError;
use crate::formats::{ImageMapping, ProcessedDocuments};
use crate::spreadsheet::{parse_csv, parse_rows};
use async_trait::async_trait;
use partlookup_common::config::CatalogConfig;
use partlookup_common::{CatalogStore, ImageIndex, Origin, PartRecord};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// What a source contributes to the catalog
#[derive(Debug, Clone)]
pub enum SourceContent {
    Records {
        origin: Origin,
        records: Vec<PartRecord>,
        rejected: usize,
    },
    Images(ImageIndex),
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> String;

    async fn read(&self) -> Result<SourceContent, IngestionError>;
}

/// Spreadsheet export: CSV, or a JSON array of row objects
pub struct StructuredFile {
    path: PathBuf,
}

impl StructuredFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for StructuredFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<SourceContent, IngestionError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let label = file_label(&self.path);

        let is_csv = self
            .path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let batch = if is_csv {
            parse_csv(&text, &label)?
        } else {
            let rows: Vec<Map<String, Value>> = serde_json::from_str(&text)?;
            parse_rows(&rows, &label)?
        };

        Ok(SourceContent::Records {
            origin: Origin::Structured,
            records: batch.records,
            rejected: batch.rejected,
        })
    }
}

/// Processed documents file written by the `ingest` run
pub struct DocumentsFile {
    path: PathBuf,
}

impl DocumentsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for DocumentsFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<SourceContent, IngestionError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let file: ProcessedDocuments = serde_json::from_str(&text)?;

        let parsed = file.into_records();
        let total = parsed.len();
        let records: Vec<PartRecord> = parsed.into_iter().filter_map(PartRecord::normalized).collect();

        Ok(SourceContent::Records {
            origin: Origin::Document,
            rejected: total - records.len(),
            records,
        })
    }
}

/// Image mapping file, paths resolved against the configured base directory
pub struct ImageMappingFile {
    path: PathBuf,
    catalog: CatalogConfig,
}

impl ImageMappingFile {
    pub fn new(path: impl Into<PathBuf>, catalog: &CatalogConfig) -> Self {
        Self {
            path: path.into(),
            catalog: catalog.clone(),
        }
    }
}

#[async_trait]
impl CatalogSource for ImageMappingFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<SourceContent, IngestionError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let mapping: ImageMapping = serde_json::from_str(&text)?;
        Ok(SourceContent::Images(
            mapping.to_index(|path| self.catalog.image_path(path)),
        ))
    }
}

/// Sources named in the catalog configuration
pub fn configured_sources(config: &CatalogConfig) -> Vec<Box<dyn CatalogSource>> {
    let mut sources: Vec<Box<dyn CatalogSource>> = Vec::new();
    if let Some(path) = &config.structured_path {
        sources.push(Box::new(StructuredFile::new(path)));
    }
    if let Some(path) = &config.documents_path {
        sources.push(Box::new(DocumentsFile::new(path)));
    }
    if let Some(path) = &config.images_path {
        sources.push(Box::new(ImageMappingFile::new(path, config)));
    }
    sources
}

/// Summary of a startup load
#[derive(Debug, Clone, Default)]
pub struct CatalogLoadReport {
    pub structured: usize,
    pub documents: usize,
    pub images: usize,
    pub rejected: usize,
    /// Sources that could not be read
    pub failed: Vec<String>,
}

/// Read every source and publish the result as one snapshot
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn load_sources(sources: &[Box<dyn CatalogSource>], store: &CatalogStore) -> CatalogLoadReport {
    let mut report = CatalogLoadReport::default();
    let mut structured = Vec::new();
    let mut documents = Vec::new();
    let mut images = ImageIndex::new();

    let results = futures::future::join_all(sources.iter().map(|source| source.read())).await;

    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(SourceContent::Records { origin, records, rejected }) => {
                info!(source = %source.name(), origin = %origin, records = records.len(), rejected, "Read catalog source");
                report.rejected += rejected;
                match origin {
                    Origin::Structured => structured.extend(records),
                    Origin::Document => documents.extend(records),
                }
            }
            Ok(SourceContent::Images(index)) => {
                info!(source = %source.name(), entries = index.len(), "Read image mapping");
                images.extend(index);
            }
            Err(e) => {
                warn!(source = %source.name(), error = %e, "Failed to read catalog source");
                report.failed.push(source.name());
            }
        }
    }

    report.structured = structured.len();
    report.documents = documents.len();
    report.images = images.len();

    store.load(structured, documents, images);
    info!(
        structured = report.structured,
        documents = report.documents,
        images = report.images,
        failed = report.failed.len(),
        "Catalog loaded"
    );
    report
}

/// Load the configured catalog files into `store`
pub async fn load_catalog(config: &CatalogConfig, store: &CatalogStore) -> CatalogLoadReport {
    load_sources(&configured_sources(config), store).await
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_structured_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "lista.csv", "Codigo,Descripcion\n1001,Filtro de aceite\n");

        let content = StructuredFile::new(path).read().await.unwrap();
        match content {
            SourceContent::Records { origin, records, .. } => {
                assert_eq!(origin, Origin::Structured);
                assert_eq!(records[0].source_label, "lista.csv");
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CatalogConfig {
            structured_path: Some(write(
                dir.path(),
                "repuestos.json",
                r#"[{"id": 1, "code": "CBL001", "description": "Cable USB tipo A"},
                    {"id": 2, "code": "", "description": "x"}]"#,
            )),
            documents_path: Some(write(
                dir.path(),
                "pdfs-data.json",
                r#"{"parts": [{"code": "55-100", "description": "Junta de culata", "imageRef": "1", "source": "motor.pdf"}]}"#,
            )),
            images_path: Some(write(
                dir.path(),
                "images-mapping.json",
                r#"{"motor.pdf": {"total_images": 1, "images": [{"filename": "a.png", "page": 1, "index": 0, "path": "img/a.png"}]}}"#,
            )),
            image_base_dir: Some("/static".to_string()),
        };

        let store = CatalogStore::new();
        let report = load_catalog(&catalog, &store).await;

        assert_eq!(report.structured, 1);
        assert_eq!(report.documents, 1);
        assert_eq!(report.images, 1);
        assert_eq!(report.rejected, 1);
        assert!(report.failed.is_empty());

        let snapshot = store.snapshot();
        assert!(snapshot.is_loaded());
        assert_eq!(snapshot.images().resolve("motor.pdf", "1").unwrap().path, "/static/img/a.png");
    }

    #[tokio::test]
    async fn test_missing_source_still_marks_loaded() {
        let catalog = CatalogConfig {
            structured_path: Some(PathBuf::from("/nonexistent/repuestos.json")),
            ..Default::default()
        };

        let store = CatalogStore::new();
        let report = load_catalog(&catalog, &store).await;

        assert_eq!(report.failed.len(), 1);
        assert!(store.is_loaded());
        assert_eq!(store.stats().total_count, 0);
    }

    #[tokio::test]
    async fn test_malformed_documents_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "pdfs-data.json", "{not json");

        let err = DocumentsFile::new(path).read().await.unwrap_err();
        assert!(matches!(err, IngestionError::Json(_)));
    }

    #[test]
    fn test_no_sources_configured() {
        let store = CatalogStore::new();
        let report = tokio_test::block_on(load_catalog(&CatalogConfig::default(), &store));
        assert!(report.failed.is_empty());
        assert!(store.is_loaded());
    }
}
