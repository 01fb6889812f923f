//! Text chunking with a fixed-stride overlap strategy.
//!
//! This module provides [`TextChunker`], which splits extracted document
//! text into bounded, overlapping segments. Two modes are supported:
//!
//! - [`chunk`](TextChunker::chunk) — fixed-stride windows of `chunk_size`
//!   characters, each overlapping the previous by `overlap` characters
//! - [`smart_chunk`](TextChunker::smart_chunk) — the same stride loop, but
//!   each window is cut at the nearest sentence boundary when one falls
//!   inside the tail of the window
//!
//! All offsets are character offsets, not byte offsets, so multi-byte text
//! (extracted PDFs are rarely ASCII) chunks safely.

use serde::{Deserialize, Serialize};

use crate::error::{PaperdexError, Result};

/// Sentence-end markers recognized by [`TextChunker::smart_chunk`].
///
/// Half-width punctuation requires a trailing space to avoid cutting at
/// abbreviations mid-sentence; full-width punctuation ends a sentence on
/// its own. A blank line always ends a sentence.
const SENTENCE_ENDS: &[&str] = &[". ", "\u{3002}", "! ", "\u{FF01}", "? ", "\u{FF1F}", "\n\n"];

/// How many characters past the window end the boundary search may look.
const BOUNDARY_SLACK: usize = 50;

/// Positional metadata attached to a chunk by
/// [`TextChunker::chunk_with_metadata`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkInfo {
    /// Source identifier the caller supplied (usually a file name).
    pub source: String,
    /// 0-based position of the chunk within the source text.
    pub chunk_index: usize,
    /// Length of the chunk in characters.
    pub chunk_size: usize,
    /// Total number of chunks produced from the source text.
    pub total_chunks: usize,
}

/// Splits text into bounded, overlapping chunks.
///
/// A pure function of its inputs: identical `(text, chunk_size, overlap)`
/// always produces identical chunk sequences.
///
/// # Example
///
/// ```rust,ignore
/// use paperdex_core::TextChunker;
///
/// let chunker = TextChunker::new(512, 50)?;
/// let chunks = chunker.smart_chunk(&text);
/// ```
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new `TextChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `overlap` — number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ConfigError`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PaperdexError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(PaperdexError::ConfigError(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// The configured maximum chunk size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into fixed-stride overlapping chunks.
    ///
    /// Each chunk is at most `chunk_size` characters; the window advances by
    /// `chunk_size - overlap` each step. Whitespace-only windows are skipped
    /// without skipping the stride. Empty or whitespace-only input yields an
    /// empty vector.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            tracing::warn!("empty text provided to chunker");
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let end = (start + self.chunk_size).min(len);
            push_non_blank(&mut chunks, &chars[start..end]);
            start += self.chunk_size - self.overlap;
        }

        tracing::debug!(chunk_count = chunks.len(), "chunked text");
        chunks
    }

    /// Split `text` into chunks, preferring sentence boundaries.
    ///
    /// Runs the same stride loop as [`chunk`](TextChunker::chunk), but before
    /// emitting each window it searches the last 20% of the window plus 50
    /// trailing characters for the earliest sentence-end marker. On a hit the
    /// chunk is cut at the boundary and the next window starts exactly there
    /// (the boundary already shortened the chunk, so no overlap is
    /// subtracted); otherwise the window falls back to fixed-stride behavior
    /// and the next window starts `overlap` characters before its end. The
    /// final window is emitted whole.
    ///
    /// No chunk exceeds `chunk_size + 50` characters.
    pub fn smart_chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            tracing::warn!("empty text provided to chunker");
            return Vec::new();
        }

        let markers: Vec<Vec<char>> =
            SENTENCE_ENDS.iter().map(|marker| marker.chars().collect()).collect();
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let end = start + self.chunk_size;

            if end >= len {
                // Final trailing window: emit whole, no boundary search.
                push_non_blank(&mut chunks, &chars[start..]);
                break;
            }

            let search_start = end - self.chunk_size / 5;
            let search_end = (end + BOUNDARY_SLACK).min(len);
            let region = &chars[search_start..search_end];

            let mut boundary: Option<usize> = None;
            for marker in &markers {
                if let Some(pos) = find_subsequence(region, marker) {
                    let cut = search_start + pos + marker.len();
                    boundary = Some(boundary.map_or(cut, |best| best.min(cut)));
                }
            }

            match boundary {
                Some(cut) => {
                    push_non_blank(&mut chunks, &chars[start..cut]);
                    start = cut;
                }
                None => {
                    push_non_blank(&mut chunks, &chars[start..end]);
                    start = end - self.overlap;
                }
            }
        }

        tracing::debug!(chunk_count = chunks.len(), "smart chunked text");
        chunks
    }

    /// Chunk `text` and attach positional metadata to each chunk.
    ///
    /// Uses fixed-stride chunking. `source` is carried through verbatim so
    /// callers can trace chunks back to their origin.
    pub fn chunk_with_metadata(&self, text: &str, source: &str) -> Vec<(String, ChunkInfo)> {
        let chunks = self.chunk(text);
        let total_chunks = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let info = ChunkInfo {
                    source: source.to_string(),
                    chunk_index,
                    chunk_size: chunk.chars().count(),
                    total_chunks,
                };
                (chunk, info)
            })
            .collect()
    }
}

/// Push a window onto `chunks` unless it is whitespace-only.
fn push_non_blank(chunks: &mut Vec<String>, window: &[char]) {
    if window.iter().any(|c| !c.is_whitespace()) {
        chunks.push(window.iter().collect());
    }
}

/// Find the first occurrence of `needle` in `haystack`, by char position.
fn find_subsequence(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = TextChunker::new(100, 20).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
        assert!(chunker.smart_chunk("").is_empty());
        assert!(chunker.smart_chunk("   ").is_empty());
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(TextChunker::new(0, 0), Err(PaperdexError::ConfigError(_))));
        assert!(matches!(TextChunker::new(100, 100), Err(PaperdexError::ConfigError(_))));
        assert!(matches!(TextChunker::new(100, 150), Err(PaperdexError::ConfigError(_))));
        assert!(TextChunker::new(100, 99).is_ok());
        assert!(TextChunker::new(1, 0).is_ok());
    }

    #[test]
    fn chunks_respect_size_bound() {
        let chunker = TextChunker::new(100, 20).unwrap();
        let text = "abcdefghij".repeat(57);
        for chunk in chunker.chunk(&text) {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn repeated_sentence_scenario() {
        // 2000 chars, size 100, overlap 20: strides of 80 from 0 to 1920
        // inclusive, so ceil((2000 - 20) / 80) = 25 chunks.
        let text = "the quick brown fox jumps over the lazy dog cool ".repeat(40);
        assert_eq!(text.len(), 1960);
        let text = format!("{text}{}", "x".repeat(40));
        assert_eq!(text.len(), 2000);

        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 25);

        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
        // Consecutive chunks share a 20-char suffix/prefix.
        for pair in chunks.windows(2) {
            let suffix: String = pair[0].chars().skip(pair[0].chars().count() - 20).collect();
            let prefix: String = pair[1].chars().take(20).collect();
            assert_eq!(suffix, prefix);
        }
    }

    #[test]
    fn overlap_removal_reconstructs_original() {
        let text = "abcdefghij".repeat(123);
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&text);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(20));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn smart_chunk_cuts_at_sentence_boundary() {
        // A period lands inside the last 20% of the first window, so the
        // first chunk must end exactly at ". ".
        let first = format!("{}. ", "a".repeat(88));
        let text = format!("{first}{}", "b".repeat(300));
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.smart_chunk(&text);

        assert_eq!(chunks[0], first);
        assert!(chunks[1].starts_with('b'));
    }

    #[test]
    fn smart_chunk_respects_slack_bound() {
        let chunker = TextChunker::new(100, 20).unwrap();
        let text = "word ".repeat(500);
        for chunk in chunker.smart_chunk(&text) {
            assert!(chunk.chars().count() <= 150, "chunk exceeds size + slack");
        }
    }

    #[test]
    fn smart_chunk_falls_back_to_fixed_stride() {
        // No sentence markers anywhere: every window falls back, and
        // consecutive chunks overlap by exactly `overlap` characters.
        let text = "x".repeat(400);
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.smart_chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.chars().count(), 100);
        }
    }

    #[test]
    fn smart_chunk_emits_final_window_whole() {
        let text = format!("{}. tail text", "a".repeat(50));
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.smart_chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn handles_multibyte_text() {
        let sentence = "这是一个关于向量检索的句子\u{3002}";
        let text = sentence.repeat(40);
        let chunker = TextChunker::new(50, 10).unwrap();

        let chunks = chunker.smart_chunk(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
        // Boundary cuts end on the full-width period.
        assert!(chunks[0].ends_with('\u{3002}'));
    }

    #[test]
    fn chunk_with_metadata_records_positions() {
        let chunker = TextChunker::new(100, 20).unwrap();
        let text = "abcdefghij".repeat(30);
        let chunks = chunker.chunk_with_metadata(&text, "paper.pdf");

        let total = chunks.len();
        for (i, (chunk, info)) in chunks.iter().enumerate() {
            assert_eq!(info.source, "paper.pdf");
            assert_eq!(info.chunk_index, i);
            assert_eq!(info.chunk_size, chunk.chars().count());
            assert_eq!(info.total_chunks, total);
        }
    }

    #[test]
    fn determinism() {
        let chunker = TextChunker::new(64, 16).unwrap();
        let text = "Sentences end here. And also here! Or maybe here? ".repeat(20);
        assert_eq!(chunker.smart_chunk(&text), chunker.smart_chunk(&text));
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }
}
