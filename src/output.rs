//! Result types returned by the conversion entry points.

use crate::document::StructuredDocument;
use serde::{Deserialize, Serialize};

/// Everything produced by one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The in-memory tree, before serialisation.
    pub document: StructuredDocument,
    /// The serialised XML.
    pub xml: String,
    pub stats: ConversionStats,
}

/// Counters and timings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub page_count: usize,
    pub heading_count: usize,
    pub paragraph_count: usize,
    /// Size of the serialised XML in bytes.
    pub xml_bytes: usize,
    /// Wall-clock time spent inside the text extractor.
    pub extract_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// What [`crate::convert::inspect`] reports about a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub file_name: String,
    pub page_count: usize,
    pub author: Option<String>,
    pub creation_date: Option<String>,
    /// Number of bytes of decoded text across all pages.
    pub text_bytes: usize,
}
