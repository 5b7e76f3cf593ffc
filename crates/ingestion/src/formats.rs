//! On-disk catalog file formats
//!
//! - processed documents: output of the `ingest` run, one entry per part line
//! - image mapping: images extracted per document, in document order

use chrono::{DateTime, Utc};
use partlookup_common::{ImageAsset, ImageIndex, ImageKey, PartRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Processed documents file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocuments {
    #[serde(default)]
    pub processed_date: DateTime<Utc>,
    #[serde(default)]
    pub total_parts: usize,
    #[serde(default, rename = "totalPDFs")]
    pub total_pdfs: usize,
    pub parts: Vec<DocumentPart>,
    #[serde(default)]
    pub pdf_details: BTreeMap<String, DocumentDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPart {
    pub code: String,
    pub description: String,
    /// Figure number, null when the line had none
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Document file name
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_line: Option<String>,
}

/// Per-document summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetails {
    pub parts_count: usize,
    #[serde(default)]
    pub text_sample: String,
}

impl From<&PartRecord> for DocumentPart {
    fn from(record: &PartRecord) -> Self {
        Self {
            code: record.code.clone(),
            description: record.description.clone(),
            image_ref: record.figure_ref.clone(),
            source: record.source_label.clone(),
            raw_line: record.raw_context.clone(),
        }
    }
}

impl DocumentPart {
    pub fn into_record(self) -> PartRecord {
        let record = PartRecord::document(self.code, self.description, self.source, self.image_ref);
        match self.raw_line {
            Some(raw) => record.with_raw_context(raw),
            None => record,
        }
    }
}

impl ProcessedDocuments {
    pub fn into_records(self) -> Vec<PartRecord> {
        self.parts.into_iter().map(DocumentPart::into_record).collect()
    }
}

/// Image mapping file, keyed by document file name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMapping(pub BTreeMap<String, DocumentImages>);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentImages {
    #[serde(default)]
    pub total_images: usize,
    #[serde(default)]
    pub images: Vec<ExtractedImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedImage {
    pub filename: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub index: Option<u32>,
    pub path: String,
}

impl ImageMapping {
    /// Figure `n` of a document maps to its `n`-th listed image (1-based).
    /// `resolve_path` turns stored paths into servable ones.
    pub fn to_index(&self, resolve_path: impl Fn(&str) -> String) -> ImageIndex {
        self.0
            .iter()
            .flat_map(|(document, entry)| {
                entry.images.iter().enumerate().map(move |(i, image)| (document, i, image))
            })
            .map(|(document, i, image)| {
                let asset = ImageAsset {
                    path: resolve_path(&image.path),
                    page: image.page,
                };
                (ImageKey::new(document, (i + 1).to_string()), asset)
            })
            .collect()
    }
}
