//! PDF ingestion: the extractor collaborator interface, its real
//! implementation, and the sentence-packing chunker.

use crate::error::{InsightError, Result};
use crate::models::DocumentChunk;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

const CHUNK_SIZE: usize = 500; // characters
const CHUNK_OVERLAP: usize = 50; // characters carried between chunks

#[derive(Debug, Clone)]
pub struct ExtractedPdf {
    pub text: String,
    pub pages: usize,
}

/// Collaborator interface over PDF text extraction. Kept behind a trait so
/// the controller can be driven without real PDF bytes.
pub trait PdfExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedPdf>;
}

/// Real extractor: `pdf_extract` for the text, `lopdf` for the page count.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedPdf> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| InsightError::Parse(format!("failed to parse PDF: {e}")))?;
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| InsightError::Parse(format!("failed to parse PDF: {e}")))?;
        let pages = document.get_pages().len();
        log::info!("extracted {} chars across {} pages", text.chars().count(), pages);
        Ok(ExtractedPdf { text, pages })
    }
}

/// Splits cleaned content into overlapping sentence-packed chunks. The page
/// of a chunk is approximated from its character position within the text.
pub fn chunk_text(content: &str, page_count: usize) -> Vec<DocumentChunk> {
    let cleaned = clean_text(content);
    let total_chars = cleaned.chars().count();
    let sentences = split_into_sentences(&cleaned);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut start_pos = 0usize;

    for sentence in sentences {
        let current_len = current.chars().count();
        if current_len + sentence.chars().count() > CHUNK_SIZE && !current.is_empty() {
            chunks.push(make_chunk(&current, start_pos, total_chars, page_count));

            // Carry the chunk tail forward so no sentence boundary context is lost.
            let overlap: String = if current_len > CHUNK_OVERLAP {
                current.chars().skip(current_len - CHUNK_OVERLAP).collect()
            } else {
                current.clone()
            };
            start_pos += current_len - overlap.chars().count();
            current = overlap + " " + &sentence;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(make_chunk(&current, start_pos, total_chars, page_count));
    }

    log::info!("created {} chunks", chunks.len());
    chunks
}

fn make_chunk(text: &str, start: usize, total_chars: usize, page_count: usize) -> DocumentChunk {
    let pages = page_count.max(1);
    let page = if total_chars == 0 {
        1
    } else {
        (start * pages / total_chars + 1).min(pages)
    };
    DocumentChunk {
        text: text.trim().to_string(),
        page,
        embedding: None,
    }
}

fn clean_text(text: &str) -> String {
    let re_special = Regex::new(r"[^\w\s.,!?;:()\-\[\]{}]").unwrap();
    let re_whitespace = Regex::new(r"\s+").unwrap();

    let cleaned = re_special.replace_all(text, " ");
    let cleaned = re_whitespace.replace_all(&cleaned, " ");
    cleaned.trim().to_string()
}

fn split_into_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence number {i} talks about transformer models and data."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn empty_content_produces_no_chunks() {
        assert!(chunk_text("", 3).is_empty());
    }

    #[test]
    fn short_content_becomes_a_single_chunk() {
        let chunks = chunk_text("One short sentence about attention.", 2);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page, 1);
        assert!(chunks[0].embedding.is_none());
    }

    #[test]
    fn long_content_is_split_with_bounded_chunks() {
        let chunks = chunk_text(&sample_text(60), 4);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // One overlong sentence may exceed the target, but packed chunks
            // stay near CHUNK_SIZE plus the overlap.
            assert!(chunk.text.chars().count() <= CHUNK_SIZE + CHUNK_OVERLAP + 100);
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap_text() {
        let chunks = chunk_text(&sample_text(60), 1);
        assert!(chunks.len() > 1);
        let first_tail: String = chunks[0]
            .text
            .chars()
            .skip(chunks[0].text.chars().count().saturating_sub(20))
            .collect();
        assert!(chunks[1].text.contains(first_tail.trim()));
    }

    #[test]
    fn pages_are_monotonic_and_in_bounds() {
        let pages = 5;
        let chunks = chunk_text(&sample_text(120), pages);
        let mut last = 0;
        for chunk in &chunks {
            assert!(chunk.page >= 1 && chunk.page <= pages);
            assert!(chunk.page >= last);
            last = chunk.page;
        }
        assert!(chunks.last().unwrap().page > 1);
    }

    #[test]
    fn cleanup_collapses_whitespace_and_strips_special_chars() {
        let chunks = chunk_text("Results:\n\n  98%  ±0.5 accuracy\t(test set).", 1);
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].text.contains('\n'));
        assert!(!chunks[0].text.contains('±'));
        assert!(!chunks[0].text.contains("  "));
    }
}
