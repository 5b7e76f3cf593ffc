//! Spreadsheet rows to structured records
//!
//! Exports rarely agree on header names, so the code and description columns
//! are picked by ordered rules: a header keyword first, then a positional
//! fallback.

use crate::errors::IngestionError;
use partlookup_common::PartRecord;
use serde_json::{Map, Value};
use tracing::debug;

const CODE_KEYWORDS: &[&str] = &["cod", "cód", "code"];
const DESCRIPTION_KEYWORDS: &[&str] = &["desc", "description", "nombre"];

/// One column-picking rule
#[derive(Debug, Clone, Copy)]
enum ColumnRule {
    /// First header containing any keyword, case-insensitively
    HeaderContains(&'static [&'static str]),
    /// Column at this position unless its header contains a keyword
    PositionUnless(usize, &'static [&'static str]),
    /// First free column whose header contains none of the keywords
    FirstWithout(&'static [&'static str]),
    /// Column at this position
    Position(usize),
    /// First column not already taken
    FirstFree,
}

const CODE_RULES: &[ColumnRule] = &[
    ColumnRule::HeaderContains(CODE_KEYWORDS),
    ColumnRule::Position(0),
];

const DESCRIPTION_RULES: &[ColumnRule] = &[
    ColumnRule::HeaderContains(DESCRIPTION_KEYWORDS),
    ColumnRule::PositionUnless(1, CODE_KEYWORDS),
    ColumnRule::FirstWithout(CODE_KEYWORDS),
    ColumnRule::Position(1),
    ColumnRule::FirstFree,
];

impl ColumnRule {
    fn pick(&self, headers: &[String], taken: Option<usize>) -> Option<usize> {
        let free = |i: &usize| Some(*i) != taken && *i < headers.len();
        let mentions = |header: &str, keywords: &[&str]| {
            let header = header.to_lowercase();
            keywords.iter().any(|k| header.contains(k))
        };

        match *self {
            ColumnRule::HeaderContains(keywords) => (0..headers.len())
                .filter(free)
                .find(|&i| mentions(headers[i].as_str(), keywords)),
            ColumnRule::PositionUnless(pos, keywords) => {
                Some(pos).filter(free).filter(|&i| !mentions(headers[i].as_str(), keywords))
            }
            ColumnRule::FirstWithout(keywords) => (0..headers.len())
                .filter(free)
                .find(|&i| !mentions(headers[i].as_str(), keywords)),
            ColumnRule::Position(pos) => Some(pos).filter(free),
            ColumnRule::FirstFree => (0..headers.len()).find(free),
        }
    }
}

fn apply(rules: &[ColumnRule], headers: &[String], taken: Option<usize>) -> Option<usize> {
    rules.iter().find_map(|rule| rule.pick(headers, taken))
}

/// Resolved column positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub code: usize,
    pub description: usize,
}

/// Pick code and description columns. `None` with fewer than two columns.
pub fn detect_columns(headers: &[String]) -> Option<ColumnMapping> {
    let code = apply(CODE_RULES, headers, None)?;
    let description = apply(DESCRIPTION_RULES, headers, Some(code))?;
    Some(ColumnMapping { code, description })
}

/// Records read from one spreadsheet
#[derive(Debug, Clone)]
pub struct SpreadsheetBatch {
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub records: Vec<PartRecord>,
    /// Rows dropped for a blank code or description
    pub rejected: usize,
}

impl SpreadsheetBatch {
    fn new(headers: Vec<String>, source_label: &str) -> Result<Self, IngestionError> {
        let mapping = detect_columns(&headers).ok_or_else(|| {
            IngestionError::malformed(
                source_label,
                format!("need at least two columns, found {}", headers.len()),
            )
        })?;
        debug!(
            source = source_label,
            code_column = %headers[mapping.code],
            description_column = %headers[mapping.description],
            "Detected spreadsheet columns"
        );
        Ok(Self {
            headers,
            mapping,
            records: Vec::new(),
            rejected: 0,
        })
    }

    fn push(&mut self, code: Option<String>, description: Option<String>, source_label: &str) {
        let record = PartRecord::structured(
            code.unwrap_or_default(),
            description.unwrap_or_default(),
            source_label,
        );
        match record.normalized() {
            Some(record) => self.records.push(record),
            None => self.rejected += 1,
        }
    }
}

/// Parse CSV text with a header row
pub fn parse_csv(text: &str, source_label: &str) -> Result<SpreadsheetBatch, IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut batch = SpreadsheetBatch::new(headers, source_label)?;
    let mapping = batch.mapping;

    for row in reader.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).map(str::to_string);
        batch.push(cell(mapping.code), cell(mapping.description), source_label);
    }

    Ok(batch)
}

/// Parse JSON row objects. Headers are the union of keys in first-seen order.
pub fn parse_rows(rows: &[Map<String, Value>], source_label: &str) -> Result<SpreadsheetBatch, IngestionError> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut batch = SpreadsheetBatch::new(headers, source_label)?;
    let code_key = batch.headers[batch.mapping.code].clone();
    let description_key = batch.headers[batch.mapping.description].clone();

    for row in rows {
        let code = row.get(&code_key).and_then(cell_text);
        let description = row.get(&description_key).and_then(cell_text);
        batch.push(code, description, source_label);
    }

    Ok(batch)
}

/// Strings and numbers are usable cell values
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
