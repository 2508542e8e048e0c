//! PDF ingestion: extracts text from a PDF and splits it into ordered,
//! overlapping chunks for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfDocument {
    pub metadata: PdfMetadata,
    pub pages: Vec<PdfPage>,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfPage {
    pub number: usize,
    pub text: String,
}

/// Builder for turning a PDF into `TextChunk`s. `chunk_size`/`chunk_overlap`
/// are word counts, an approximation of the source system's
/// `TokenTextSplitter(chunk_size=512, chunk_overlap=50)`; exact tokenizer
/// parity isn't required since chunking is a collaborator opaque to the core.
pub struct PdfParser {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for PdfParser {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

impl PdfParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    #[cfg(feature = "pdf")]
    pub fn parse_file(&self, path: &Path) -> Result<PdfDocument, PdfError> {
        use pdf_extract::extract_text;

        let text = extract_text(path).map_err(|e| PdfError::ExtractionFailed(e.to_string()))?;
        let pages = split_into_pages(&text);
        let title = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string());

        Ok(PdfDocument {
            metadata: PdfMetadata {
                title,
                page_count: pages.len(),
            },
            pages,
            text,
        })
    }

    #[cfg(not(feature = "pdf"))]
    pub fn parse_file(&self, _path: &Path) -> Result<PdfDocument, PdfError> {
        Err(PdfError::FeatureNotEnabled)
    }

    /// Splits each page's text into word-budgeted chunks with a trailing-word
    /// overlap carried into the next chunk of the same page.
    pub fn create_chunks(&self, doc: &PdfDocument) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        let pages: Vec<&PdfPage> = if doc.pages.is_empty() {
            Vec::new()
        } else {
            doc.pages.iter().collect()
        };

        if pages.is_empty() {
            self.chunk_page_text(&doc.text, 1, &mut chunks);
        } else {
            for page in pages {
                self.chunk_page_text(&page.text, page.number, &mut chunks);
            }
        }

        chunks
    }

    fn chunk_page_text(&self, text: &str, page_number: usize, out: &mut Vec<TextChunk>) {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return;
        }

        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            let text = words[start..end].join(" ");
            out.push(TextChunk {
                id: out.len(),
                text,
                page_number,
            });
            if end == words.len() {
                break;
            }
            start += step;
        }
    }
}

fn split_into_pages(text: &str) -> Vec<PdfPage> {
    let mut pages = Vec::new();
    let mut current_page = String::new();
    let mut page_num = 1;

    for line in text.lines() {
        if line.contains('\x0C') || (current_page.len() > 3000 && line.trim().is_empty()) {
            if !current_page.trim().is_empty() {
                pages.push(PdfPage {
                    number: page_num,
                    text: current_page.clone(),
                });
                page_num += 1;
                current_page.clear();
            }
        } else {
            current_page.push_str(line);
            current_page.push('\n');
        }
    }

    if !current_page.trim().is_empty() {
        pages.push(PdfPage {
            number: page_num,
            text: current_page,
        });
    }

    pages
}

/// One chunk of chunked document text, ready for the Extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: usize,
    pub text: String,
    pub page_number: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("PDF feature not enabled. Compile with --features pdf")]
    FeatureNotEnabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> PdfDocument {
        PdfDocument {
            metadata: PdfMetadata::default(),
            pages: vec![PdfPage {
                number: 1,
                text: text.to_string(),
            }],
            text: text.to_string(),
        }
    }

    #[test]
    fn chunks_respect_word_budget() {
        let text = (0..100).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let parser = PdfParser::new().with_chunk_size(20).with_overlap(5);
        let chunks = parser.create_chunks(&doc(&text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.split_whitespace().count() <= 20);
        }
    }

    #[test]
    fn never_emits_empty_chunk() {
        let parser = PdfParser::new().with_chunk_size(20).with_overlap(5);
        let chunks = parser.create_chunks(&doc(""));
        assert!(chunks.is_empty());
    }

    #[test]
    fn consecutive_chunks_overlap_by_configured_word_count() {
        let text = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let parser = PdfParser::new().with_chunk_size(10).with_overlap(3);
        let chunks = parser.create_chunks(&doc(&text));
        assert!(chunks.len() >= 2);
        let first_words: Vec<&str> = chunks[0].text.split_whitespace().collect();
        let second_words: Vec<&str> = chunks[1].text.split_whitespace().collect();
        let overlap = &first_words[first_words.len() - 3..];
        assert_eq!(overlap, &second_words[..3]);
    }

    #[test]
    fn chunks_carry_page_number() {
        let parser = PdfParser::new().with_chunk_size(5).with_overlap(0);
        let chunks = parser.create_chunks(&doc("one two three four five six seven"));
        assert!(chunks.iter().all(|c| c.page_number == 1));
    }
}
