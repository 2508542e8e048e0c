//! Document ingestion: turns a PDF into ordered text chunks for the
//! extraction pipeline. Chunking strategy is a collaborator opaque to the
//! data model crate; this crate owns it.

pub mod pdf;

pub use pdf::{PdfDocument, PdfError, PdfMetadata, PdfPage, PdfParser, TextChunk};
