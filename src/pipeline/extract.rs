//! Text extraction: decode a PDF's text layer and document info via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while it parses. [`extract_text`] moves the work onto
//! Tokio's blocking pool so async callers (the service, the CLI) never stall
//! a worker thread.
//!
//! ## Page joins
//!
//! Pages are joined with a blank line. The structurer treats a blank line as
//! a hard boundary, so a paragraph never runs across a page break.

use crate::config::ConversionConfig;
use crate::error::Pdf2XmlError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable naming a pdfium library file or directory.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// Separator inserted between the text of consecutive pages.
pub const PAGE_JOIN: &str = "\n\n";

/// Decoded text plus the document-info fields the XML metadata needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPdf {
    pub text: String,
    pub page_count: usize,
    pub author: Option<String>,
    pub creation_date: Option<String>,
}

/// Turns PDF bytes into text. Implementations block; call through
/// [`extract_text`] from async code.
pub trait TextExtractor: Send + Sync {
    fn extract(
        &self,
        name: &str,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<ExtractedPdf, Pdf2XmlError>;
}

/// [`TextExtractor`] backed by a dynamically bound pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    lib_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// `lib_path` may name the library file itself or the directory holding it.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.pdfium_lib_path.clone())
    }

    /// Bind to pdfium: explicit path, then `PDFIUM_LIB_PATH`, then the system library.
    fn bind(&self) -> Result<Pdfium, Pdf2XmlError> {
        let explicit = self
            .lib_path
            .clone()
            .or_else(|| std::env::var_os(PDFIUM_LIB_ENV).map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => {
                let lib = if path.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(&path)
                } else {
                    path
                };
                debug!("Binding pdfium from {}", lib.display());
                Pdfium::bind_to_library(&lib)
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| Pdf2XmlError::PdfiumBindingFailed(format!("{e:?}")))?;

        Ok(Pdfium::new(bindings))
    }
}

impl TextExtractor for PdfiumExtractor {
    fn extract(
        &self,
        name: &str,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<ExtractedPdf, Pdf2XmlError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| load_error(name, password, e))?;

        let metadata = document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };
        let author = get_meta(PdfDocumentMetadataTagType::Author);
        let creation_date = get_meta(PdfDocumentMetadataTagType::CreationDate);

        let pages = document.pages();
        let page_count = pages.len() as usize;
        let mut page_texts = Vec::with_capacity(page_count);
        for (idx, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| Pdf2XmlError::TextExtractionFailed {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })?
                .all();
            debug!("Page {} → {} chars", idx + 1, text.len());
            page_texts.push(text);
        }

        info!("Extracted text from '{}': {} pages", name, page_count);

        Ok(ExtractedPdf {
            text: page_texts.join(PAGE_JOIN),
            page_count,
            author,
            creation_date,
        })
    }
}

/// Map a pdfium load failure to the most specific error we can name.
fn load_error(name: &str, password: Option<&str>, e: PdfiumError) -> Pdf2XmlError {
    let detail = format!("{e:?}");
    if detail.contains("Password") || detail.contains("password") {
        if password.is_some() {
            Pdf2XmlError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            Pdf2XmlError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        Pdf2XmlError::CorruptPdf {
            name: name.to_string(),
            detail,
        }
    }
}

/// Run `extractor` on the blocking pool.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    name: &str,
    bytes: Arc<[u8]>,
    password: Option<String>,
) -> Result<ExtractedPdf, Pdf2XmlError> {
    let name_owned = name.to_string();
    tokio::task::spawn_blocking(move || {
        extractor.extract(&name_owned, &bytes, password.as_deref())
    })
    .await
    .map_err(|e| Pdf2XmlError::Internal(format!("Extraction task panicked: {e}")))?
}
