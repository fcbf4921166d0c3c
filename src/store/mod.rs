//! Persistence for uploaded PDFs, generated XML, and conversion records.
//!
//! Two traits split the concerns:
//!
//! * [`BlobStore`] — opaque byte blobs addressed by a [`BlobId`].
//! * [`ConversionLedger`] — one [`ConversionRecord`] per finished
//!   conversion, scoped by owner.
//!
//! Both backends ([`MemoryStore`], [`FsStore`]) implement both traits. A
//! store is constructed once by the caller and shared as an `Arc`; nothing
//! here is global.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use uuid::Uuid;

/// MIME type of uploaded sources.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// MIME type of generated documents.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Opaque blob identifier (a UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    pub fn generate() -> Self {
        Self(new_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BlobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fresh UUID v4 as a hyphenated string.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// True when `id` has the shape [`new_id`] produces.
///
/// Backends use this to turn malformed ids into `NotFound` before they
/// touch a map key or a path.
pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Everything about a blob except its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    pub id: BlobId,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// A blob with its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub meta: BlobMeta,
    pub bytes: Vec<u8>,
}

/// Lifecycle state of a conversion record.
///
/// Conversion runs inline with the upload, so a stored record is always
/// complete; failures never produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Completed,
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStatus::Completed => f.write_str("completed"),
        }
    }
}

/// Bookkeeping for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub id: String,
    pub owner: String,
    pub original_filename: String,
    pub pdf_blob: BlobId,
    pub xml_blob: BlobId,
    pub created_at: DateTime<Utc>,
    pub status: ConversionStatus,
}

/// Byte storage for source PDFs and generated XML.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a fresh id.
    fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<BlobMeta, StoreError>> + Send;

    /// Fetch a blob. Unknown ids yield [`StoreError::NotFound`].
    fn get(&self, id: &BlobId) -> impl Future<Output = Result<StoredBlob, StoreError>> + Send;

    /// Remove a blob. Unknown ids yield [`StoreError::NotFound`].
    fn delete(&self, id: &BlobId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Conversion history, scoped by owner.
pub trait ConversionLedger: Send + Sync {
    fn insert(&self, record: ConversionRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The record with this id, if it exists *and* belongs to `owner`.
    fn find(
        &self,
        owner: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<ConversionRecord>, StoreError>> + Send;

    /// All of `owner`'s records, newest first.
    fn list(&self, owner: &str) -> impl Future<Output = Result<Vec<ConversionRecord>, StoreError>> + Send;
}

/// Newest first; ties broken by id so the order is stable.
pub(crate) fn sort_newest_first(records: &mut [ConversionRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
