//! Part record model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which ingestion pipeline produced a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Spreadsheet-derived rows
    Structured,
    /// Records extracted from scanned manuals
    Document,
}

impl Origin {
    pub const ALL: [Origin; 2] = [Origin::Structured, Origin::Document];

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Structured => "structured",
            Origin::Document => "document",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "structured" | "excel" | "spreadsheet" => Ok(Origin::Structured),
            "document" | "pdf" => Ok(Origin::Document),
            other => Err(format!("unknown origin '{}'", other)),
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    /// Stock-keeping code
    pub code: String,

    /// Free-text description
    pub description: String,

    pub origin: Origin,

    /// Spreadsheet or document name the record came from
    pub source_label: String,

    /// Figure number inside the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figure_ref: Option<String>,

    /// Excerpt of the raw source line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_context: Option<String>,
}

impl PartRecord {
    pub fn structured(
        code: impl Into<String>,
        description: impl Into<String>,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            origin: Origin::Structured,
            source_label: source_label.into(),
            figure_ref: None,
            raw_context: None,
        }
    }

    pub fn document(
        code: impl Into<String>,
        description: impl Into<String>,
        source_label: impl Into<String>,
        figure_ref: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            origin: Origin::Document,
            source_label: source_label.into(),
            figure_ref,
            raw_context: None,
        }
    }

    pub fn with_raw_context(mut self, raw: impl Into<String>) -> Self {
        self.raw_context = Some(raw.into());
        self
    }

    /// Trim code and description, returning `None` when either ends up empty.
    ///
    /// Empty figure references and contexts are dropped; structured records
    /// never carry either.
    pub fn normalized(self) -> Option<Self> {
        let code = self.code.trim();
        let description = self.description.trim();
        if code.is_empty() || description.is_empty() {
            return None;
        }

        let is_document = self.origin == Origin::Document;
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && is_document)
        };

        Some(Self {
            code: code.to_string(),
            description: description.to_string(),
            origin: self.origin,
            source_label: self.source_label.trim().to_string(),
            figure_ref: non_blank(self.figure_ref),
            raw_context: non_blank(self.raw_context),
        })
    }

    /// Human readable provenance shown next to a result
    pub fn display_source(&self) -> String {
        match self.origin {
            Origin::Structured => "Excel".to_string(),
            Origin::Document => format!("PDF: {}", self.source_label),
        }
    }
}
