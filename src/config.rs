//! Configuration types for PDF-to-XML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The heading thresholds are *not*
//! configurable; they live as constants in [`crate::structure`].

use crate::error::Pdf2XmlError;
use crate::xml::XmlOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest accepted indent width.
pub const MAX_INDENT_WIDTH: usize = 8;

/// Default upload limit: 50 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for a PDF-to-XML conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdf2xml::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .pretty(false)
///     .max_input_bytes(10 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert!(!config.pretty);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pretty-print the XML output. Default: true.
    pub pretty: bool,

    /// Spaces per nesting level when pretty-printing. Range: 0–8. Default: 2.
    pub indent_width: usize,

    /// Reject inputs larger than this many bytes. Default: 50 MiB.
    pub max_input_bytes: u64,

    /// Explicit pdfium library file or directory.
    ///
    /// When `None`, `PDFIUM_LIB_PATH` is consulted, then the system library.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            password: None,
            pretty: true,
            indent_width: 2,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            pdfium_lib_path: None,
        }
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pretty", &self.pretty)
            .field("indent_width", &self.indent_width)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Serializer options derived from this config.
    pub fn xml_options(&self) -> XmlOptions {
        XmlOptions {
            pretty: self.pretty,
            indent_width: self.indent_width,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pretty(mut self, v: bool) -> Self {
        self.config.pretty = v;
        self
    }

    pub fn indent_width(mut self, n: usize) -> Self {
        self.config.indent_width = n;
        self
    }

    pub fn max_input_bytes(mut self, n: u64) -> Self {
        self.config.max_input_bytes = n;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2XmlError> {
        let c = &self.config;
        if c.indent_width > MAX_INDENT_WIDTH {
            return Err(Pdf2XmlError::InvalidConfig(format!(
                "indent width must be 0–{MAX_INDENT_WIDTH}, got {}",
                c.indent_width
            )));
        }
        if c.max_input_bytes == 0 {
            return Err(Pdf2XmlError::InvalidConfig(
                "max input size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}
