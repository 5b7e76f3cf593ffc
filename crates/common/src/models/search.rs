//! Search-facing views of catalog records

use super::part::{Origin, PartRecord};
use serde::{Deserialize, Serialize};

/// Which origins a search should look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    #[serde(default = "default_enabled")]
    pub structured: bool,
    #[serde(default = "default_enabled")]
    pub document: bool,
}

fn default_enabled() -> bool { true }

impl Default for SourceFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl SourceFilter {
    pub fn all() -> Self {
        Self { structured: true, document: true }
    }

    pub fn none() -> Self {
        Self { structured: false, document: false }
    }

    pub fn only(origin: Origin) -> Self {
        Self {
            structured: origin == Origin::Structured,
            document: origin == Origin::Document,
        }
    }

    pub fn includes(&self, origin: Origin) -> bool {
        match origin {
            Origin::Structured => self.structured,
            Origin::Document => self.document,
        }
    }

    /// Number of origins switched on
    pub fn enabled_count(&self) -> usize {
        Origin::ALL.iter().filter(|o| self.includes(**o)).count()
    }
}

/// A part record enriched with provenance and image linkage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub code: String,
    pub description: String,

    /// Origin surfaced to the caller
    pub source_type: Origin,

    /// Display label ("Excel" or "PDF: <document>")
    pub source: String,

    pub source_label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_context: Option<String>,

    /// True whenever the record mentions a figure, even if no asset resolved
    pub has_image: bool,

    pub resolved_image_path: Option<String>,
}

impl SearchResult {
    pub fn from_record(record: &PartRecord, resolved_image_path: Option<String>) -> Self {
        Self {
            code: record.code.clone(),
            description: record.description.clone(),
            source_type: record.origin,
            source: record.display_source(),
            source_label: record.source_label.clone(),
            figure_ref: record.figure_ref.clone(),
            raw_context: record.raw_context.clone(),
            has_image: record.figure_ref.is_some(),
            resolved_image_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_counts() {
        assert_eq!(SourceFilter::all().enabled_count(), 2);
        assert_eq!(SourceFilter::only(Origin::Document).enabled_count(), 1);
        assert_eq!(SourceFilter::none().enabled_count(), 0);
    }

    #[test]
    fn test_filter_deserialize_defaults() {
        let filter: SourceFilter = serde_json::from_str(r#"{"document": false}"#).unwrap();
        assert!(filter.structured);
        assert!(!filter.document);
    }

    #[test]
    fn test_result_reports_figure_without_asset() {
        let record = PartRecord::document("CBL001", "Cable de batería", "manual.pdf", Some("12".into()));
        let result = SearchResult::from_record(&record, None);
        assert!(result.has_image);
        assert_eq!(result.resolved_image_path, None);
        assert_eq!(result.source, "PDF: manual.pdf");
    }
}
