//! Input loading: read a local PDF or vet uploaded bytes before extraction.
//!
//! pdfium reports a truncated or non-PDF file as a generic load failure, so
//! the cheap checks (existence, permission, size, `%PDF` magic) run here
//! first and produce errors the caller can act on.

use crate::error::Pdf2XmlError;
use std::path::Path;
use tracing::debug;

/// The four bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF read into memory, with the name it should be reported under.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The last path component, or the whole path if it has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Check that `bytes` look like a PDF and fit under `max_bytes`.
pub fn validate_pdf_bytes(name: &str, bytes: &[u8], max_bytes: u64) -> Result<(), Pdf2XmlError> {
    if bytes.is_empty() {
        return Err(Pdf2XmlError::EmptyInput {
            name: name.to_string(),
        });
    }
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(Pdf2XmlError::InputTooLarge {
            name: name.to_string(),
            size,
            limit: max_bytes,
        });
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(Pdf2XmlError::NotAPdf {
            name: name.to_string(),
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }
    Ok(())
}

/// Read a local PDF, validating existence, permissions, size and magic bytes.
pub async fn load_pdf(path: &Path, max_bytes: u64) -> Result<LoadedPdf, Pdf2XmlError> {
    let io_err = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Pdf2XmlError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Pdf2XmlError::FileNotFound {
            path: path.to_path_buf(),
        },
    };

    let meta = tokio::fs::metadata(path).await.map_err(io_err)?;
    if !meta.is_file() {
        return Err(Pdf2XmlError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file_name = file_name_of(path);
    // Size check before reading so an oversized file is never loaded.
    if meta.len() > max_bytes {
        return Err(Pdf2XmlError::InputTooLarge {
            name: file_name,
            size: meta.len(),
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(io_err)?;
    validate_pdf_bytes(&file_name, &bytes, max_bytes)?;

    debug!("Loaded local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(LoadedPdf { file_name, bytes })
}
