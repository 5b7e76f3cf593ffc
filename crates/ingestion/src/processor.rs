//! Ingestion processor
//!
//! Two pipelines feed the catalog:
//! - record batches (spreadsheet rows or document parts) validated all-or-nothing
//!   and handed to the catalog store
//! - a directory of PDF manuals turned into the processed documents file

use crate::document::{truncate_chars, DocumentLineParser};
use crate::errors::IngestionError;
use crate::formats::{DocumentDetails, DocumentPart, ProcessedDocuments};
use crate::pdf::extract_text_from_pdf;
use chrono::Utc;
use partlookup_common::{metrics, CatalogStore, ImageIndex, Origin, PartRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// How a batch is applied to its origin's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Replace,
    Append,
}

/// Outcome of an accepted batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub batch_id: Uuid,
    pub origin: Origin,
    pub mode: WriteMode,
    pub accepted: usize,
    pub rejected: usize,
    /// Catalog generation after the write
    pub generation: u64,
}

/// Normalize `records` for `origin`.
///
/// Records that are blank after trimming, or that belong to another origin,
/// are rejected. A batch with nothing left is an error.
pub fn validate_batch(
    origin: Origin,
    records: Vec<PartRecord>,
) -> Result<(Vec<PartRecord>, usize), IngestionError> {
    let total = records.len();
    let accepted: Vec<PartRecord> = records
        .into_iter()
        .filter(|r| r.origin == origin)
        .filter_map(PartRecord::normalized)
        .collect();
    let rejected = total - accepted.len();

    if accepted.is_empty() {
        return Err(IngestionError::EmptyBatch { origin, rejected });
    }
    Ok((accepted, rejected))
}

/// Writes validated batches into the catalog store
#[derive(Clone)]
pub struct BatchIngestor {
    store: Arc<CatalogStore>,
}

impl BatchIngestor {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    /// Validate and apply a batch. On error the store is not touched.
    #[instrument(skip(self, records), fields(batch_size = records.len()))]
    pub fn ingest(
        &self,
        origin: Origin,
        mode: WriteMode,
        records: Vec<PartRecord>,
    ) -> Result<IngestReport, IngestionError> {
        self.ingest_with_rejects(origin, mode, records, 0)
    }

    /// Like [`ingest`](Self::ingest), counting `already_rejected` rows dropped
    /// before the records were built.
    pub fn ingest_with_rejects(
        &self,
        origin: Origin,
        mode: WriteMode,
        records: Vec<PartRecord>,
        already_rejected: usize,
    ) -> Result<IngestReport, IngestionError> {
        let (accepted, rejected) = match validate_batch(origin, records) {
            Ok(valid) => valid,
            Err(IngestionError::EmptyBatch { origin, rejected }) => {
                let rejected = rejected + already_rejected;
                metrics::record_ingestion(origin.as_str(), 0, rejected);
                warn!(origin = %origin, rejected, "Rejected empty batch");
                return Err(IngestionError::EmptyBatch { origin, rejected });
            }
            Err(e) => return Err(e),
        };
        let rejected = rejected + already_rejected;
        let accepted_count = accepted.len();

        let snapshot = match mode {
            WriteMode::Replace => self.store.replace(origin, accepted),
            WriteMode::Append => self.store.append(origin, accepted),
        };
        metrics::record_ingestion(origin.as_str(), accepted_count, rejected);

        let report = IngestReport {
            batch_id: Uuid::new_v4(),
            origin,
            mode,
            accepted: accepted_count,
            rejected,
            generation: snapshot.generation(),
        };
        info!(
            batch_id = %report.batch_id,
            origin = %origin,
            mode = ?mode,
            accepted = report.accepted,
            rejected = report.rejected,
            "Batch ingested"
        );
        Ok(report)
    }

    /// Replace the figure-to-image index
    pub fn ingest_images(&self, index: ImageIndex) -> u64 {
        let entries = index.len();
        let snapshot = self.store.set_image_index(index);
        info!(entries, generation = snapshot.generation(), "Image index replaced");
        snapshot.generation()
    }
}

/// Parts extracted from one PDF
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub name: String,
    pub parts: Vec<PartRecord>,
    pub text_sample: String,
}

/// Turns PDF manuals into document-origin records
pub struct DocumentProcessor {
    parser: DocumentLineParser,
    text_sample_len: usize,
}

impl DocumentProcessor {
    pub fn new(parser: DocumentLineParser, text_sample_len: usize) -> Self {
        Self {
            parser,
            text_sample_len,
        }
    }

    /// Extract and parse one PDF. Blocking.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedDocument, IngestionError> {
        let name = file_name(path);
        let extracted = extract_text_from_pdf(path)?;
        let parts = self.parser.parse(&extracted.text, &name);

        info!(
            document = %name,
            pages = extracted.page_count,
            chars = extracted.text.len(),
            parts = parts.len(),
            "Processed document"
        );

        Ok(ProcessedDocument {
            text_sample: truncate_chars(&extracted.text, self.text_sample_len).to_string(),
            name,
            parts,
        })
    }

    /// Process every `*.pdf` in `dir`, one blocking task per file.
    ///
    /// A document that fails to parse contributes no parts and an empty sample.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub async fn process_directory(self: Arc<Self>, dir: &Path) -> Result<ProcessedDocuments, IngestionError> {
        let files = list_pdfs(dir).await?;
        if files.is_empty() {
            return Err(IngestionError::NoDocuments(dir.display().to_string()));
        }
        info!(count = files.len(), "Found PDF documents");

        let tasks = files.into_iter().map(|path| {
            let processor = Arc::clone(&self);
            tokio::task::spawn_blocking(move || {
                let result = processor.process_file(&path);
                (path, result)
            })
        });

        let mut documents = Vec::new();
        for joined in futures::future::join_all(tasks).await {
            let (path, result) = joined.map_err(|e| IngestionError::Task(e.to_string()))?;
            match result {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!(document = %path.display(), error = %e, "Failed to process document");
                    documents.push(ProcessedDocument {
                        name: file_name(&path),
                        parts: Vec::new(),
                        text_sample: String::new(),
                    });
                }
            }
        }

        Ok(assemble(documents))
    }
}

/// Combine per-document results into the processed documents file
pub fn assemble(documents: Vec<ProcessedDocument>) -> ProcessedDocuments {
    let mut output = ProcessedDocuments {
        processed_date: Utc::now(),
        total_pdfs: documents.len(),
        ..Default::default()
    };

    for document in documents {
        output.pdf_details.insert(
            document.name.clone(),
            DocumentDetails {
                parts_count: document.parts.len(),
                text_sample: document.text_sample,
            },
        );
        output.parts.extend(document.parts.iter().map(DocumentPart::from));
    }
    output.total_parts = output.parts.len();
    output
}

/// Write the processed documents file, creating parent directories
pub async fn write_output(output: &ProcessedDocuments, path: &Path) -> Result<(), IngestionError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(output)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, IngestionError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LineLimits;

    fn ingestor() -> (Arc<CatalogStore>, BatchIngestor) {
        let store = Arc::new(CatalogStore::new());
        (Arc::clone(&store), BatchIngestor::new(store))
    }

    #[test]
    fn test_replace_batch() {
        let (store, ingestor) = ingestor();
        let report = ingestor
            .ingest(
                Origin::Structured,
                WriteMode::Replace,
                vec![
                    PartRecord::structured(" 1001 ", "Filtro", "a.csv"),
                    PartRecord::structured("", "Sin codigo", "a.csv"),
                ],
            )
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.generation, 1);
        assert_eq!(store.snapshot().structured()[0].code, "1001");
    }

    #[test]
    fn test_empty_batch_leaves_store_untouched() {
        let (store, ingestor) = ingestor();
        ingestor
            .ingest(
                Origin::Structured,
                WriteMode::Replace,
                vec![PartRecord::structured("1", "Tuerca", "a.csv")],
            )
            .unwrap();

        let err = ingestor
            .ingest(
                Origin::Structured,
                WriteMode::Replace,
                vec![PartRecord::structured("  ", "x", "a.csv")],
            )
            .unwrap_err();

        assert!(matches!(err, IngestionError::EmptyBatch { rejected: 1, .. }));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.structured().len(), 1);
        assert_eq!(snapshot.generation(), 1);
    }

    #[test]
    fn test_wrong_origin_rejected() {
        let (_, ingestor) = ingestor();
        let report = ingestor
            .ingest(
                Origin::Document,
                WriteMode::Append,
                vec![
                    PartRecord::structured("1", "Tuerca", "a.csv"),
                    PartRecord::document("2", "Arandela", "m.pdf", None),
                ],
            )
            .unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn test_prior_rejects_counted() {
        let (_, ingestor) = ingestor();
        let err = ingestor
            .ingest_with_rejects(Origin::Structured, WriteMode::Append, Vec::new(), 4)
            .unwrap_err();
        assert!(matches!(err, IngestionError::EmptyBatch { rejected: 4, .. }));
    }

    #[test]
    fn test_append_keeps_existing() {
        let (store, ingestor) = ingestor();
        let first = vec![PartRecord::document("A-1", "Junta", "m.pdf", Some("1".into()))];
        let second = vec![PartRecord::document("A-2", "Reten", "m.pdf", None)];
        ingestor.ingest(Origin::Document, WriteMode::Replace, first).unwrap();
        ingestor.ingest(Origin::Document, WriteMode::Append, second).unwrap();

        let codes: Vec<_> = store.snapshot().documents().iter().map(|r| r.code.clone()).collect();
        assert_eq!(codes, vec!["A-1", "A-2"]);
    }

    #[test]
    fn test_ingest_images() {
        let (store, ingestor) = ingestor();
        let index: ImageIndex = vec![(
            partlookup_common::ImageKey::new("m.pdf", "1"),
            partlookup_common::ImageAsset::new("img/1.png"),
        )]
        .into_iter()
        .collect();

        assert_eq!(ingestor.ingest_images(index), 1);
        assert!(store.snapshot().images().resolve("m.pdf", "1").is_some());
    }

    #[test]
    fn test_assemble_output() {
        let documents = vec![
            ProcessedDocument {
                name: "a.pdf".into(),
                parts: vec![PartRecord::document("A-1", "Junta de culata larga", "a.pdf", Some("3".into()))],
                text_sample: "A-1 Junta".into(),
            },
            ProcessedDocument {
                name: "b.pdf".into(),
                parts: Vec::new(),
                text_sample: String::new(),
            },
        ];

        let output = assemble(documents);
        assert_eq!(output.total_pdfs, 2);
        assert_eq!(output.total_parts, 1);
        assert_eq!(output.parts[0].image_ref.as_deref(), Some("3"));
        assert_eq!(output.pdf_details["b.pdf"].parts_count, 0);
    }

    #[tokio::test]
    async fn test_directory_without_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a pdf").unwrap();

        let parser = DocumentLineParser::new(LineLimits::default()).unwrap();
        let processor = Arc::new(DocumentProcessor::new(parser, 5000));
        let err = processor.process_directory(dir.path()).await.unwrap_err();
        assert!(matches!(err, IngestionError::NoDocuments(_)));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.PDF"), b"%PDF-1.4 garbage").unwrap();

        let parser = DocumentLineParser::new(LineLimits::default()).unwrap();
        let processor = Arc::new(DocumentProcessor::new(parser, 5000));
        let output = processor.process_directory(dir.path()).await.unwrap();

        assert_eq!(output.total_pdfs, 1);
        assert_eq!(output.total_parts, 0);
        assert_eq!(output.pdf_details["broken.PDF"].parts_count, 0);
    }

    #[tokio::test]
    async fn test_write_output_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed/pdfs-data.json");

        write_output(&assemble(Vec::new()), &path).await.unwrap();

        let written: ProcessedDocuments =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.total_pdfs, 0);
    }
}
