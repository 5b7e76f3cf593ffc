//! PDF text extraction
//!
//! Walks page content streams with lopdf and keeps the line structure the
//! document parser relies on: every text block and every explicit line move
//! (`Td`, `TD`, `T*`, `'`, `"`) starts a new line.

use crate::errors::IngestionError;
use std::path::Path;
use tracing::{debug, warn};

/// Text pulled out of a single PDF
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Extract line-preserving text from a PDF file
pub fn extract_text_from_pdf(path: &Path) -> Result<ExtractedText, IngestionError> {
    let doc = lopdf::Document::load(path).map_err(|e| IngestionError::PdfParseError {
        path: path.display().to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages();
    debug!(page_count = pages.len(), "Extracting text from PDF");

    let mut text = String::new();
    for (page_num, page_id) in pages.iter() {
        match doc.get_page_content(*page_id) {
            Ok(content) => {
                text.push_str(&extract_text_from_content(&content));
                text.push('\n');
            }
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to read page content, skipping");
            }
        }
    }

    let cleaned = clean_text(&text);
    if cleaned.is_empty() {
        return Err(IngestionError::PdfParseError {
            path: path.display().to_string(),
            message: "No text content extracted from PDF".to_string(),
        });
    }

    debug!(original_len = text.len(), cleaned_len = cleaned.len(), "Text extraction complete");

    Ok(ExtractedText {
        text: cleaned,
        page_count: pages.len(),
    })
}

/// Text operators of a content stream, one output line per text line
fn extract_text_from_content(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_line = String::new();

    let flush = |line: &mut String, out: &mut String| {
        if !line.trim().is_empty() {
            out.push_str(line.trim());
            out.push('\n');
        }
        line.clear();
    };

    for raw in content_str.lines() {
        let trimmed = raw.trim();

        match trimmed {
            "BT" => {
                in_text_block = true;
                continue;
            }
            "ET" => {
                in_text_block = false;
                flush(&mut current_line, &mut text);
                continue;
            }
            _ => {}
        }

        if !in_text_block {
            continue;
        }

        if starts_new_line(trimmed) {
            flush(&mut current_line, &mut text);
        }

        if let Some(shown) = extract_text_from_operator(trimmed) {
            current_line.push_str(&shown);
        }
    }
    flush(&mut current_line, &mut text);

    text
}

fn starts_new_line(op_line: &str) -> bool {
    op_line.ends_with(" Td")
        || op_line.ends_with(" TD")
        || op_line == "T*"
        || op_line.ends_with('\'')
        || op_line.ends_with('"')
}

/// Text shown by a `Tj`, `TJ`, `'` or `"` operator line
fn extract_text_from_operator(line: &str) -> Option<String> {
    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if end > start {
            return Some(decode_pdf_string(&line[start + 1..end]));
        }
        return None;
    }

    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut current = String::new();
        let mut in_paren = false;
        let mut escaped = false;

        for ch in line.chars() {
            if in_paren {
                match ch {
                    _ if escaped => {
                        current.push(ch);
                        escaped = false;
                    }
                    '\\' => {
                        current.push(ch);
                        escaped = true;
                    }
                    ')' => {
                        in_paren = false;
                        result.push_str(&decode_pdf_string(&current));
                        current.clear();
                    }
                    _ => current.push(ch),
                }
            } else if ch == '(' {
                in_paren = true;
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF literal string escapes
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                // PDFDocEncoding agrees with Latin-1 for accented letters
                if let Some(decoded) = char::from_u32(value) {
                    result.push(decoded);
                }
            }
            Some(c) => result.push(c),
            None => {}
        }
    }

    result
}

/// Collapse whitespace inside lines and drop blank lines
fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.replace('\u{FEFF}', "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_keeps_lines() {
        let input = "Hello   World\n\n  \nTest\t line";
        assert_eq!(clean_text(input), "Hello World\nTest line");
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string("Hello\\nWorld"), "Hello\nWorld");
        assert_eq!(decode_pdf_string("Test\\(paren\\)"), "Test(paren)");
        assert_eq!(decode_pdf_string("Pi\\361on"), "Piñon");
    }

    #[test]
    fn test_text_blocks_become_lines() {
        let content = b"BT\n/F1 10 Tf\n(1234-A Tornillo hexagonal M8) Tj\nET\nBT\n(Fig. 3) Tj\nET\n";
        let text = extract_text_from_content(content);
        assert_eq!(text, "1234-A Tornillo hexagonal M8\nFig. 3\n");
    }

    #[test]
    fn test_line_moves_split_block() {
        let content = b"BT\n(AB-100 Junta) Tj\n( de culata) Tj\n0 -12 Td\n(AB-200 Filtro) Tj\nET\n";
        let text = extract_text_from_content(content);
        assert_eq!(text, "AB-100 Junta de culata\nAB-200 Filtro\n");
    }

    #[test]
    fn test_tj_array() {
        let content = b"BT\n[(77) -250 (Bomba \\(agua\\))] TJ\nET\n";
        assert_eq!(extract_text_from_content(content), "77Bomba (agua)\n");
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let err = extract_text_from_pdf(Path::new("/nonexistent/manual.pdf")).unwrap_err();
        assert!(matches!(err, IngestionError::PdfParseError { .. }));
    }
}
