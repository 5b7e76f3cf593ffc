//! Ingestion error types

use partlookup_common::{AppError, Origin};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("PDF parse error for {path}: {message}")]
    PdfParseError { path: String, message: String },

    #[error("No PDF documents found in {0}")]
    NoDocuments(String),

    #[error("Batch for {origin} has no valid records ({rejected} rejected)")]
    EmptyBatch { origin: Origin, rejected: usize },

    #[error("Malformed source {source_name}: {message}")]
    MalformedSource { source_name: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex_lite::Error),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IngestionError {
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        IngestionError::MalformedSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::EmptyBatch { origin, rejected } => AppError::EmptyBatch {
                origin: origin.to_string(),
                rejected,
            },
            IngestionError::MalformedSource { source_name, message } => {
                AppError::MalformedSource { source_name, message }
            }
            IngestionError::Csv(e) => AppError::MalformedSource {
                source_name: "csv".to_string(),
                message: e.to_string(),
            },
            IngestionError::Json(e) => AppError::Serialization(e),
            IngestionError::IoError(e) => AppError::Io(e),
            other => AppError::Internal {
                message: other.to_string(),
            },
        }
    }
}
