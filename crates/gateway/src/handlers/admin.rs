//! Catalog administration handlers
//!
//! Batches are validated as a whole: when nothing survives normalization the
//! request fails and the published catalog is left as it was.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AppState;
use partlookup_common::{
    errors::{AppError, Result},
    Origin, PartRecord,
};
use partlookup_ingestion::spreadsheet::{parse_csv, parse_rows, SpreadsheetBatch};
use partlookup_ingestion::{ImageMapping, IngestReport, WriteMode};

const DEFAULT_SOURCE_LABEL: &str = "api";

/// Body of a catalog batch: exactly one of `records`, `rows` or `csv`
#[derive(Debug, Deserialize)]
pub struct CatalogBatchRequest {
    #[serde(flatten)]
    pub batch: CatalogBatch,

    /// Spreadsheet or document name recorded on every record
    #[serde(default)]
    pub source_label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogBatch {
    /// Ready-made records for the target origin
    Records(Vec<RecordInput>),
    /// Spreadsheet rows keyed by column header (structured only)
    Rows(Vec<Map<String, Value>>),
    /// CSV export with a header row (structured only)
    Csv(String),
}

#[derive(Debug, Deserialize)]
pub struct RecordInput {
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub source_label: Option<String>,
    #[serde(default)]
    pub figure_ref: Option<String>,
    #[serde(default)]
    pub raw_context: Option<String>,
}

impl RecordInput {
    fn into_record(self, origin: Origin, default_label: &str) -> PartRecord {
        let label = self.source_label.unwrap_or_else(|| default_label.to_string());
        match origin {
            Origin::Structured => PartRecord::structured(self.code, self.description, label),
            Origin::Document => {
                let record = PartRecord::document(self.code, self.description, label, self.figure_ref);
                match self.raw_context {
                    Some(raw) => record.with_raw_context(raw),
                    None => record,
                }
            }
        }
    }
}

#[derive(Serialize)]
pub struct ImagesResponse {
    pub entries: usize,
    pub generation: u64,
}

/// Replace every record of an origin
pub async fn replace_catalog(
    State(state): State<AppState>,
    Path(origin): Path<String>,
    Json(request): Json<CatalogBatchRequest>,
) -> Result<Json<IngestReport>> {
    apply_batch(&state, &origin, WriteMode::Replace, request)
}

/// Append records to an origin
pub async fn append_catalog(
    State(state): State<AppState>,
    Path(origin): Path<String>,
    Json(request): Json<CatalogBatchRequest>,
) -> Result<Json<IngestReport>> {
    apply_batch(&state, &origin, WriteMode::Append, request)
}

/// Replace the figure-to-image index from an image mapping document
pub async fn replace_images(
    State(state): State<AppState>,
    Json(mapping): Json<ImageMapping>,
) -> Result<Json<ImagesResponse>> {
    let catalog = &state.config.catalog;
    let index = mapping.to_index(|path| catalog.image_path(path));
    let entries = index.len();
    let generation = state.ingestor.ingest_images(index);

    Ok(Json(ImagesResponse { entries, generation }))
}

fn apply_batch(
    state: &AppState,
    origin: &str,
    mode: WriteMode,
    request: CatalogBatchRequest,
) -> Result<Json<IngestReport>> {
    let origin: Origin = origin
        .parse()
        .map_err(|_| AppError::UnknownOrigin(origin.to_string()))?;
    let label = request
        .source_label
        .as_deref()
        .unwrap_or(DEFAULT_SOURCE_LABEL);

    let (records, rejected) = match request.batch {
        CatalogBatch::Records(inputs) => {
            let records: Vec<PartRecord> = inputs
                .into_iter()
                .map(|input| input.into_record(origin, label))
                .collect();
            (records, 0)
        }
        CatalogBatch::Rows(rows) => {
            require_structured(origin, "rows")?;
            spreadsheet_records(parse_rows(&rows, label)?)
        }
        CatalogBatch::Csv(text) => {
            require_structured(origin, "csv")?;
            spreadsheet_records(parse_csv(&text, label)?)
        }
    };

    let report = state
        .ingestor
        .ingest_with_rejects(origin, mode, records, rejected)?;
    Ok(Json(report))
}

fn spreadsheet_records(batch: SpreadsheetBatch) -> (Vec<PartRecord>, usize) {
    (batch.records, batch.rejected)
}

fn require_structured(origin: Origin, field: &str) -> Result<()> {
    if origin == Origin::Structured {
        return Ok(());
    }
    Err(AppError::Validation {
        message: format!("'{}' batches are only accepted for the structured origin", field),
        field: Some(field.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_shapes() {
        let request: CatalogBatchRequest =
            serde_json::from_str(r#"{"csv": "a,b\n1,2", "source_label": "lista.csv"}"#).unwrap();
        assert!(matches!(request.batch, CatalogBatch::Csv(_)));
        assert_eq!(request.source_label.as_deref(), Some("lista.csv"));

        let request: CatalogBatchRequest =
            serde_json::from_str(r#"{"records": [{"code": "1", "description": "Tuerca"}]}"#).unwrap();
        assert!(matches!(request.batch, CatalogBatch::Records(ref r) if r.len() == 1));
    }

    #[test]
    fn test_document_record_keeps_figure() {
        let input = RecordInput {
            code: "55-100".into(),
            description: "Junta".into(),
            source_label: None,
            figure_ref: Some("4".into()),
            raw_context: Some("55-100 Junta Fig. 4".into()),
        };
        let record = input.into_record(Origin::Document, "motor.pdf");
        assert_eq!(record.source_label, "motor.pdf");
        assert_eq!(record.figure_ref.as_deref(), Some("4"));
        assert!(record.raw_context.is_some());
    }

    #[test]
    fn test_rows_rejected_for_documents() {
        let err = require_structured(Origin::Document, "rows").unwrap_err();
        assert!(err.is_client_error());
    }
}
