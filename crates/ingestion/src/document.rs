//! Part lines in extracted manual text
//!
//! A part line starts with a code token (uppercase letter or digit followed by
//! at least two word characters, dashes, dots or slashes) and continues with a
//! description. Figure references ("Fig. 3", "Figura 12", "Ref. 4", "Nº 7")
//! are taken from the description or, failing that, from the next line.

use crate::errors::IngestionError;
use partlookup_common::config::IngestionConfig;
use partlookup_common::PartRecord;
use regex_lite::Regex;
use tracing::debug;

const PART_LINE_PATTERN: &str = r"^([A-Z0-9][\w\-./]{2,})\s+(.+)$";
const FIGURE_PATTERN: &str = r"(?i)(?:Fig\.|Figura|Ref\.|N[ºo]\.?)\s*(\d+)";

/// Length limits applied while parsing
#[derive(Debug, Clone, Copy)]
pub struct LineLimits {
    /// Shortest accepted description, in characters
    pub min_description_len: usize,
    pub max_description_len: usize,
    pub max_context_len: usize,
}

impl Default for LineLimits {
    fn default() -> Self {
        Self {
            min_description_len: 11,
            max_description_len: 200,
            max_context_len: 150,
        }
    }
}

impl From<&IngestionConfig> for LineLimits {
    fn from(config: &IngestionConfig) -> Self {
        Self {
            min_description_len: config.min_description_len,
            max_description_len: config.max_description_len,
            max_context_len: config.max_context_len,
        }
    }
}

/// Turns document text into document-origin part records
#[derive(Debug, Clone)]
pub struct DocumentLineParser {
    part_line: Regex,
    figure: Regex,
    limits: LineLimits,
}

impl DocumentLineParser {
    pub fn new(limits: LineLimits) -> Result<Self, IngestionError> {
        Ok(Self {
            part_line: Regex::new(PART_LINE_PATTERN)?,
            figure: Regex::new(FIGURE_PATTERN)?,
            limits,
        })
    }

    pub fn limits(&self) -> LineLimits {
        self.limits
    }

    /// First figure number mentioned in `text`
    pub fn figure_ref(&self, text: &str) -> Option<String> {
        self.figure
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Parse every part line of `text`, attributing records to `source_label`
    pub fn parse(&self, text: &str, source_label: &str) -> Vec<PartRecord> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut records = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = self.part_line.captures(line) else {
                continue;
            };
            let (Some(code), Some(rest)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let description = rest.as_str();
            if description.chars().count() < self.limits.min_description_len {
                continue;
            }

            let figure = self
                .figure_ref(description)
                .or_else(|| lines.get(i + 1).and_then(|next| self.figure_ref(next)));

            let record = PartRecord::document(
                code.as_str(),
                truncate_chars(description, self.limits.max_description_len),
                source_label,
                figure,
            )
            .with_raw_context(truncate_chars(line, self.limits.max_context_len));

            if let Some(record) = record.normalized() {
                records.push(record);
            }
        }

        debug!(source = source_label, lines = lines.len(), parts = records.len(), "Parsed document text");
        records
    }
}

/// Prefix of at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partlookup_common::Origin;

    fn parser() -> DocumentLineParser {
        DocumentLineParser::new(LineLimits::default()).unwrap()
    }

    #[test]
    fn test_parse_part_line() {
        let records = parser().parse("1234-A  Tornillo hexagonal M8x20 zincado", "manual.pdf");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.code, "1234-A");
        assert_eq!(record.description, "Tornillo hexagonal M8x20 zincado");
        assert_eq!(record.origin, Origin::Document);
        assert_eq!(record.source_label, "manual.pdf");
        assert_eq!(record.figure_ref, None);
        assert_eq!(
            record.raw_context.as_deref(),
            Some("1234-A  Tornillo hexagonal M8x20 zincado")
        );
    }

    #[test]
    fn test_short_description_rejected() {
        // exactly ten characters after the code
        assert!(parser().parse("AB12 0123456789", "m.pdf").is_empty());
        assert_eq!(parser().parse("AB12 01234567890", "m.pdf").len(), 1);
    }

    #[test]
    fn test_code_token_shape() {
        let p = parser();
        assert!(p.parse("ab12 lowercase codes are not part lines", "m.pdf").is_empty());
        assert!(p.parse("A1 token is too short for a code here", "m.pdf").is_empty());
        let records = p.parse("A1/2.3 slash and dot are part of the code", "m.pdf");
        assert_eq!(records[0].code, "A1/2.3");
    }

    #[test]
    fn test_figure_in_description() {
        let records = parser().parse("55-100 Junta de culata ver Fig. 12 detalle", "m.pdf");
        assert_eq!(records[0].figure_ref.as_deref(), Some("12"));

        let records = parser().parse("55-101 Junta de carter (figura 7)", "m.pdf");
        assert_eq!(records[0].figure_ref.as_deref(), Some("7"));

        let records = parser().parse("55-102 Arandela de presion Nº 3 inferior", "m.pdf");
        assert_eq!(records[0].figure_ref.as_deref(), Some("3"));
    }

    #[test]
    fn test_figure_in_next_line() {
        let text = "900-12 Bomba de agua completa con junta\n\n   Ref. 4\n";
        let records = parser().parse(text, "m.pdf");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].figure_ref.as_deref(), Some("4"));
    }

    #[test]
    fn test_description_figure_wins_over_next_line() {
        let text = "900-12 Bomba de agua Fig. 2 completa\nFig. 9";
        let records = parser().parse(text, "m.pdf");
        assert_eq!(records[0].figure_ref.as_deref(), Some("2"));
    }

    #[test]
    fn test_truncation_limits() {
        let long = "x".repeat(400);
        let records = parser().parse(&format!("CODE1 {}", long), "m.pdf");
        assert_eq!(records[0].description.chars().count(), 200);
        assert_eq!(records[0].raw_context.as_ref().unwrap().chars().count(), 150);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("pieza ñandú", 8), "pieza ña");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_non_part_lines_skipped() {
        let text = "CATALOGO DE REPUESTOS\n\nPagina 3\n7001 Filtro de aceite motor diesel";
        let records = parser().parse(text, "m.pdf");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "CATALOGO");
        assert_eq!(records[1].code, "7001");
    }
}
