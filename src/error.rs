//! Error types for the edgequake-pdf2xml library.
//!
//! Two error types reflect two layers:
//!
//! * [`Pdf2XmlError`] — **Fatal**: the conversion or lookup cannot proceed
//!   (bad input file, wrong password, pdfium missing, unknown conversion id).
//!   Returned from the `convert*` functions and from
//!   [`crate::service::ConversionService`].
//!
//! * [`StoreError`] — raised by [`crate::store`] backends. It converts into
//!   [`Pdf2XmlError::Store`] so callers of the service only match one enum.
//!
//! The structuring heuristic itself has no error type: any sequence of
//! lines, including the empty one, yields a document.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2xml library.
#[derive(Debug, Error)]
pub enum Pdf2XmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input bytes do not start with the `%PDF` magic.
    #[error("Input '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// An upload or file contained no bytes at all.
    #[error("Input '{name}' is empty")]
    EmptyInput { name: String },

    /// The input exceeds the configured size limit.
    #[error("Input '{name}' is {size} bytes, over the {limit}-byte limit")]
    InputTooLarge { name: String, size: u64, limit: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// pdfium-render failed while reading a page's text layer.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install libpdfium system-wide, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n"
    )]
    PdfiumBindingFailed(String),

    // ── XML errors ────────────────────────────────────────────────────────
    /// The serializer could not write the document.
    #[error("Failed to write XML: {0}")]
    XmlWrite(String),

    /// Stored or supplied XML does not have the document shape.
    #[error("Malformed document XML: {0}")]
    MalformedXml(String),

    // ── Service errors ────────────────────────────────────────────────────
    /// Extraction, structuring or serialisation failed inside the service.
    ///
    /// The underlying cause is logged; callers only see this generic signal.
    #[error("Failed to convert '{file_name}' to XML")]
    ConversionFailed { file_name: String, reason: String },

    /// No conversion with this id exists for the requesting owner.
    #[error("Conversion '{id}' not found")]
    ConversionNotFound { id: String },

    /// Persistence backend failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output XML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by blob and record stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No blob or record with this id.
    #[error("{kind} '{id}' not found in store")]
    NotFound { kind: &'static str, id: String },

    /// Filesystem failure in [`crate::store::FsStore`].
    #[error("Store I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metadata or record file could not be (de)serialised.
    #[error("Store record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
