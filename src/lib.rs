//! # edgequake-pdf2xml
//!
//! Convert PDF documents to a simple structured XML: document metadata plus
//! an ordered list of `<heading>` and `<paragraph>` elements.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      read a local file or vet uploaded bytes
//!  ├─ 2. Extract    decode text + document info via pdfium (spawn_blocking)
//!  ├─ 3. Structure  one-pass heading/paragraph heuristic
//!  ├─ 4. Serialise  quick-xml writer
//!  └─ 5. Persist    optional: blob store + conversion history
//! ```
//!
//! ## The heuristic
//!
//! Each line is trimmed. Blank lines close the current paragraph. A line of
//! at most [`structure::HEADING_MAX_WORDS`] words and
//! [`structure::HEADING_MAX_CHARS`] UTF-16 units is a heading. Everything else
//! is appended (with a trailing space) to the open paragraph. There is no
//! font or layout analysis.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2xml::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     println!("{}", output.xml);
//!     eprintln!("{} headings / {} paragraphs",
//!         output.stats.heading_count,
//!         output.stats.paragraph_count);
//!     Ok(())
//! }
//! ```
//!
//! Structuring alone needs no pdfium at all:
//!
//! ```rust
//! use edgequake_pdf2xml::{structure, ContentNode, SourceMetadata};
//!
//! let doc = structure(["Intro", "", "a line long enough to count as body text"],
//!                     SourceMetadata::new("a.pdf", 1));
//! assert_eq!(doc.content[0], ContentNode::Heading("Intro".into()));
//! assert_eq!(doc.metadata.author, "Unknown");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2xml` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod service;
pub mod store;
pub mod structure;
pub mod xml;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_file, convert_with, inspect,
    xml_file_name,
};
pub use document::{ContentNode, DocumentMetadata, SourceMetadata, StructuredDocument};
pub use error::{Pdf2XmlError, StoreError};
pub use output::{ConversionOutput, ConversionStats, PdfInfo};
pub use pipeline::extract::{ExtractedPdf, PdfiumExtractor, TextExtractor};
pub use service::{ConversionService, ConversionSummary, XmlDownload};
pub use store::{BlobId, BlobStore, ConversionLedger, ConversionRecord, FsStore, MemoryStore};
pub use structure::{classify, line_length, split_lines, structure, structure_at, LineKind};
pub use xml::{parse_document, to_xml_string, XmlOptions};
