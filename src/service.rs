//! Upload → convert → persist workflow, plus history and download lookups.
//!
//! [`ConversionService`] is the piece a web handler or CLI command talks to.
//! It owns nothing global: the store and the text extractor are handed in
//! at construction, so tests can run it against [`crate::store::MemoryStore`]
//! and a canned extractor.
//!
//! Every lookup is scoped by `owner`. A record that exists but belongs to
//! someone else is reported exactly like a missing one.

use crate::config::ConversionConfig;
use crate::convert::{convert_with, xml_file_name};
use crate::error::Pdf2XmlError;
use crate::output::ConversionOutput;
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use crate::pipeline::input::validate_pdf_bytes;
use crate::store::{
    new_id, BlobId, BlobStore, ConversionLedger, ConversionRecord, ConversionStatus, PDF_CONTENT_TYPE,
    XML_CONTENT_TYPE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// One line of a user's conversion history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub id: String,
    pub original_filename: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversionRecord> for ConversionSummary {
    fn from(r: &ConversionRecord) -> Self {
        Self {
            id: r.id.clone(),
            original_filename: r.original_filename.clone(),
            created_at: r.created_at,
        }
    }
}

/// XML bytes ready to hand back to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDownload {
    /// Suggested attachment name, e.g. `report.xml`.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Converts uploads and answers history queries against an injected store.
pub struct ConversionService<S> {
    store: Arc<S>,
    extractor: Arc<dyn TextExtractor>,
    config: ConversionConfig,
}

impl<S> ConversionService<S>
where
    S: BlobStore + ConversionLedger,
{
    pub fn new(store: Arc<S>, extractor: Arc<dyn TextExtractor>, config: ConversionConfig) -> Self {
        Self {
            store,
            extractor,
            config,
        }
    }

    /// Service backed by pdfium, bound per `config`.
    pub fn with_pdfium(store: Arc<S>, config: ConversionConfig) -> Self {
        let extractor = Arc::new(PdfiumExtractor::from_config(&config));
        Self::new(store, extractor, config)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Store an uploaded PDF, convert it, store the XML, and record the result.
    ///
    /// Input validation errors (empty, oversized, not a PDF) are returned
    /// as-is. Anything that goes wrong after the PDF is stored is logged,
    /// every blob written for this upload is removed, and the caller gets
    /// [`Pdf2XmlError::ConversionFailed`].
    pub async fn submit(
        &self,
        owner: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ConversionRecord, Pdf2XmlError> {
        self.submit_with_output(owner, file_name, bytes)
            .await
            .map(|(record, _)| record)
    }

    /// Same as [`submit`](Self::submit), also returning the conversion output
    /// whose XML was stored.
    pub async fn submit_with_output(
        &self,
        owner: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(ConversionRecord, ConversionOutput), Pdf2XmlError> {
        validate_pdf_bytes(file_name, &bytes, self.config.max_input_bytes)?;

        let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), file_name);
        let pdf = self
            .store
            .put(&stored_name, PDF_CONTENT_TYPE, bytes.clone())
            .await?;
        info!("Stored upload '{}' as blob {}", file_name, pdf.id);

        let mut xml_blob = None;
        let result = self
            .convert_and_record(owner, file_name, bytes, &pdf.id, &mut xml_blob)
            .await;
        match result {
            Ok(done) => Ok(done),
            Err(e) => {
                error!("PDF conversion error for '{}': {}", file_name, e);
                for id in std::iter::once(pdf.id).chain(xml_blob) {
                    if let Err(cleanup) = self.store.delete(&id).await {
                        warn!("Could not remove blob {} after failure: {}", id, cleanup);
                    }
                }
                Err(Pdf2XmlError::ConversionFailed {
                    file_name: file_name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Everything after the source PDF is stored. `xml_blob` is set as soon
    /// as the XML is written so the caller can remove it on a later failure.
    async fn convert_and_record(
        &self,
        owner: &str,
        file_name: &str,
        bytes: Vec<u8>,
        pdf_blob: &BlobId,
        xml_blob: &mut Option<BlobId>,
    ) -> Result<(ConversionRecord, ConversionOutput), Pdf2XmlError> {
        let output = convert_with(Arc::clone(&self.extractor), bytes, file_name, &self.config).await?;

        let xml = self
            .store
            .put(&xml_file_name(file_name), XML_CONTENT_TYPE, output.xml.as_bytes().to_vec())
            .await?;
        *xml_blob = Some(xml.id.clone());

        let record = ConversionRecord {
            id: new_id(),
            owner: owner.to_string(),
            original_filename: file_name.to_string(),
            pdf_blob: pdf_blob.clone(),
            xml_blob: xml.id,
            created_at: Utc::now(),
            status: ConversionStatus::Completed,
        };
        self.store.insert(record.clone()).await?;
        info!(
            "Saved conversion {} for '{}' ({} headings, {} paragraphs)",
            record.id, file_name, output.stats.heading_count, output.stats.paragraph_count
        );
        Ok((record, output))
    }

    /// The record for `id`, if `owner` has one.
    pub async fn status(&self, owner: &str, id: &str) -> Result<ConversionRecord, Pdf2XmlError> {
        self.store
            .find(owner, id)
            .await?
            .ok_or_else(|| Pdf2XmlError::ConversionNotFound { id: id.to_string() })
    }

    /// `owner`'s conversions, newest first.
    pub async fn history(&self, owner: &str) -> Result<Vec<ConversionSummary>, Pdf2XmlError> {
        let records = self.store.list(owner).await?;
        Ok(records.iter().map(ConversionSummary::from).collect())
    }

    /// The generated XML for `id`, with its download name.
    pub async fn fetch_xml(&self, owner: &str, id: &str) -> Result<XmlDownload, Pdf2XmlError> {
        let record = self.status(owner, id).await?;
        let blob = self.store.get(&record.xml_blob).await?;
        Ok(XmlDownload {
            file_name: xml_file_name(&record.original_filename),
            content_type: blob.meta.content_type,
            bytes: blob.bytes,
        })
    }
}
