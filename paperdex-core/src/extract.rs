//! PDF text and metadata extraction.
//!
//! Wraps the `pdf-extract` crate and adds the metadata heuristics the rest
//! of the pipeline needs: a title guessed from the opening lines and a
//! publication year guessed from the first 1000 characters. OCR and
//! layout-aware extraction are out of scope; a scanned PDF simply yields
//! no text, which the pipeline reports as a soft failure.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::document::DocumentMetadata;
use crate::error::{PaperdexError, Result};

/// Lines matching this look like a date stamp, not a title.
static DATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[-/]\d{1,2}").expect("valid regex"));

/// Four-digit years between 2000 and 2039.
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20[0-3][0-9])\b").expect("valid regex"));

/// The extraction collaborator's output: raw text plus document metadata.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Full text content, pages joined with newlines.
    pub text: String,
    /// Metadata derived from the file and the text heuristics.
    pub metadata: DocumentMetadata,
}

/// Extracts text and metadata from PDF files.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text and metadata from the PDF at `path`.
    ///
    /// The document handle is scoped to this call; it is released on every
    /// exit path, including extraction failure.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ExtractionError`] if the file does not
    /// exist or cannot be parsed as a PDF.
    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        if !path.exists() {
            return Err(PaperdexError::ExtractionError {
                path: path.display().to_string(),
                message: "file not found".to_string(),
            });
        }

        let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
            PaperdexError::ExtractionError {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        let page_count = pages.len();
        let text = pages.join("\n");

        if text.trim().is_empty() {
            warn!(path = %path.display(), "no text extracted from PDF");
        }

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = DocumentMetadata {
            title: title_heuristic(&text),
            author: "Unknown".to_string(),
            year: year_heuristic(&text),
            filename,
            pages: page_count,
        };

        debug!(
            path = %path.display(),
            chars = text.len(),
            pages = page_count,
            "extracted PDF"
        );
        Ok(ExtractedDocument { text, metadata })
    }
}

/// Guess a title from the first plausible line of the text.
///
/// Scans the first 15 non-empty lines and returns the first one that is
/// 10 to 200 characters, not a bare number or date, and not a URL.
/// Falls back to `"Untitled"`.
pub(crate) fn title_heuristic(text: &str) -> String {
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()).take(15) {
        let len = line.chars().count();
        if !(10..=200).contains(&len) {
            continue;
        }
        if line.chars().all(|c| c.is_ascii_digit()) || DATE_LINE.is_match(line) {
            continue;
        }
        let lower = line.to_lowercase();
        if lower.contains("http") || lower.contains("www") {
            continue;
        }
        return line.to_string();
    }
    "Untitled".to_string()
}

/// Guess a publication year: the most frequent 20xx match in the first
/// 1000 characters.
pub(crate) fn year_heuristic(text: &str) -> Option<i32> {
    let sample: String = text.chars().take(1000).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for m in YEAR.find_iter(&sample) {
        *counts.entry(m.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .and_then(|(year, _)| year.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_extraction_error() {
        let extractor = PdfExtractor::new();
        let err = extractor.extract(Path::new("/nonexistent/paper.pdf")).unwrap_err();
        assert!(matches!(err, PaperdexError::ExtractionError { .. }));
    }

    #[test]
    fn title_skips_short_lines_numbers_and_urls() {
        let text = "3\n2024-01\nhttp://arxiv.org/abs/1234\nwww.example.com page\n\
                    Attention Is All You Need In Practice\nAuthors here";
        assert_eq!(title_heuristic(text), "Attention Is All You Need In Practice");
    }

    #[test]
    fn title_falls_back_to_untitled() {
        assert_eq!(title_heuristic(""), "Untitled");
        assert_eq!(title_heuristic("short\n42\n"), "Untitled");
    }

    #[test]
    fn year_picks_most_frequent_match() {
        let text = "Published 2023. Revised 2024. Cited as (2024). See also 1999.";
        assert_eq!(year_heuristic(text), Some(2024));
    }

    #[test]
    fn year_ignores_out_of_range_and_late_text() {
        assert_eq!(year_heuristic("written in 1987"), None);
        let text = format!("{}2024", "x".repeat(1500));
        assert_eq!(year_heuristic(&text), None);
    }
}
