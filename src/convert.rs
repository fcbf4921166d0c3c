//! Conversion entry points.
//!
//! Every entry point funnels into [`convert_with`]: extract text on the
//! blocking pool, segment it, serialise it. The extractor is injected so the
//! service and the tests can swap pdfium out.

use crate::config::ConversionConfig;
use crate::document::SourceMetadata;
use crate::error::Pdf2XmlError;
use crate::output::{ConversionOutput, ConversionStats, PdfInfo};
use crate::pipeline::extract::{extract_text, PdfiumExtractor, TextExtractor};
use crate::pipeline::input::{self, validate_pdf_bytes};
use crate::structure::{split_lines, structure};
use crate::xml::to_xml_string;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a local PDF file to XML.
///
/// # Errors
/// - File not found / permission denied / too large / not a PDF
/// - pdfium could not be bound or could not open the document
pub async fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2XmlError> {
    let path = path.as_ref();
    info!("Starting conversion: {}", path.display());
    let loaded = input::load_pdf(path, config.max_input_bytes).await?;
    let extractor: Arc<dyn TextExtractor> = Arc::new(PdfiumExtractor::from_config(config));
    convert_with(extractor, loaded.bytes, &loaded.file_name, config).await
}

/// Convert PDF bytes held in memory (an upload, a database blob) to XML.
///
/// `file_name` is only used for the `<fileName>` element and error messages.
pub async fn convert_from_bytes(
    bytes: impl Into<Vec<u8>>,
    file_name: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2XmlError> {
    let extractor: Arc<dyn TextExtractor> = Arc::new(PdfiumExtractor::from_config(config));
    convert_with(extractor, bytes, file_name, config).await
}

/// Core flow shared by all entry points, with the extractor supplied by the caller.
pub async fn convert_with(
    extractor: Arc<dyn TextExtractor>,
    bytes: impl Into<Vec<u8>>,
    file_name: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2XmlError> {
    let total_start = Instant::now();
    let bytes: Arc<[u8]> = Arc::from(bytes.into());
    validate_pdf_bytes(file_name, &bytes, config.max_input_bytes)?;

    // ── Step 1: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let extracted = extract_text(extractor, file_name, bytes, config.password.clone()).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    debug!(
        "Extracted {} bytes of text in {}ms",
        extracted.text.len(),
        extract_duration_ms
    );

    // ── Step 2: Structure ────────────────────────────────────────────────
    let meta = SourceMetadata {
        file_name: file_name.to_string(),
        page_count: extracted.page_count,
        author: extracted.author,
        creation_date: extracted.creation_date,
    };
    let document = structure(split_lines(&extracted.text), meta);

    // ── Step 3: Serialise ────────────────────────────────────────────────
    let xml = to_xml_string(&document, config.xml_options())?;

    let heading_count = document.headings().count();
    let stats = ConversionStats {
        page_count: document.metadata.page_count,
        heading_count,
        paragraph_count: document.content.len() - heading_count,
        xml_bytes: xml.len(),
        extract_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: '{}' → {} headings, {} paragraphs, {}ms total",
        file_name, stats.heading_count, stats.paragraph_count, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        document,
        xml,
        stats,
    })
}

/// Convert a PDF and write the XML directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2XmlError> {
    let output = convert(path, config).await?;
    write_atomic(output_path.as_ref(), output.xml.as_bytes()).await?;
    Ok(output.stats)
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Pdf2XmlError> {
    let write_err = |e| Pdf2XmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("xml.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2XmlError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2XmlError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(path, config))
}

/// Report page count and document info without structuring the text.
pub async fn inspect(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PdfInfo, Pdf2XmlError> {
    let loaded = input::load_pdf(path.as_ref(), config.max_input_bytes).await?;
    let extractor: Arc<dyn TextExtractor> = Arc::new(PdfiumExtractor::from_config(config));
    let extracted = extract_text(
        extractor,
        &loaded.file_name,
        Arc::from(loaded.bytes),
        config.password.clone(),
    )
    .await?;
    Ok(PdfInfo {
        file_name: loaded.file_name,
        page_count: extracted.page_count,
        author: extracted.author,
        creation_date: extracted.creation_date,
        text_bytes: extracted.text.len(),
    })
}

static PDF_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.pdf$").unwrap());

/// Name under which the XML for `original` is stored and downloaded.
///
/// A trailing `.pdf` (any case) becomes `.xml`; otherwise `.xml` is appended.
pub fn xml_file_name(original: &str) -> String {
    if PDF_SUFFIX.is_match(original) {
        PDF_SUFFIX.replace(original, ".xml").into_owned()
    } else {
        format!("{original}.xml")
    }
}
