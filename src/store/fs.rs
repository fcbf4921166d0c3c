//! Directory-backed store.
//!
//! ```text
//! <root>/
//!   blobs/<id>.bin     raw bytes
//!   blobs/<id>.json    BlobMeta
//!   records/<id>.json  ConversionRecord
//! ```
//!
//! Every file is written to a `.tmp` sibling and renamed into place, so a
//! crash never leaves a half-written record. Ids are checked with
//! [`is_valid_id`] before they become path components.

use super::{
    is_valid_id, sort_newest_first, BlobId, BlobMeta, BlobStore, ConversionLedger,
    ConversionRecord, StoredBlob,
};
use crate::error::StoreError;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { root: root.into() };
        for dir in [store.blob_dir(), store.record_dir()] {
            tokio::fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;
        }
        debug!("Opened store at {}", store.root.display());
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    fn record_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    fn blob_data_path(&self, id: &BlobId) -> PathBuf {
        self.blob_dir().join(format!("{id}.bin"))
    }

    fn blob_meta_path(&self, id: &BlobId) -> PathBuf {
        self.blob_dir().join(format!("{id}.json"))
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.record_dir().join(format!("{id}.json"))
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes).await.map_err(io_error(&tmp))?;
    tokio::fs::rename(&tmp, path).await.map_err(io_error(path))?;
    Ok(())
}

async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes).await
}

/// Read and decode a JSON file; `Ok(None)` when it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path)(e)),
    }
}

impl BlobStore for FsStore {
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<BlobMeta, StoreError> {
        let meta = BlobMeta {
            id: BlobId::generate(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
            created_at: Utc::now(),
        };
        // Data first: a meta file only ever points at complete bytes.
        write_atomic(&self.blob_data_path(&meta.id), &bytes).await?;
        write_json(&self.blob_meta_path(&meta.id), &meta).await?;
        debug!("Stored blob {} ({}, {} bytes)", meta.id, meta.name, meta.size);
        Ok(meta)
    }

    async fn get(&self, id: &BlobId) -> Result<StoredBlob, StoreError> {
        if !is_valid_id(id.as_str()) {
            return Err(not_found("blob", id.as_str()));
        }
        let meta: BlobMeta = read_json(&self.blob_meta_path(id))
            .await?
            .ok_or_else(|| not_found("blob", id.as_str()))?;
        let data_path = self.blob_data_path(id);
        let bytes = match tokio::fs::read(&data_path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(not_found("blob", id.as_str()))
            }
            Err(e) => return Err(io_error(&data_path)(e)),
        };
        Ok(StoredBlob { meta, bytes })
    }

    async fn delete(&self, id: &BlobId) -> Result<(), StoreError> {
        if !is_valid_id(id.as_str()) {
            return Err(not_found("blob", id.as_str()));
        }
        // Meta first: once it is gone the blob is unreachable.
        let meta_path = self.blob_meta_path(id);
        match tokio::fs::remove_file(&meta_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(not_found("blob", id.as_str()))
            }
            Err(e) => return Err(io_error(&meta_path)(e)),
        }
        let data_path = self.blob_data_path(id);
        if let Err(e) = tokio::fs::remove_file(&data_path).await {
            warn!("Blob {} meta removed but data remains: {}", id, e);
        }
        Ok(())
    }
}

impl ConversionLedger for FsStore {
    async fn insert(&self, record: ConversionRecord) -> Result<(), StoreError> {
        if !is_valid_id(&record.id) {
            return Err(not_found("conversion", &record.id));
        }
        write_json(&self.record_path(&record.id), &record).await
    }

    async fn find(&self, owner: &str, id: &str) -> Result<Option<ConversionRecord>, StoreError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let record: Option<ConversionRecord> = read_json(&self.record_path(id)).await?;
        Ok(record.filter(|r| r.owner == owner))
    }

    async fn list(&self, owner: &str) -> Result<Vec<ConversionRecord>, StoreError> {
        let dir = self.record_dir();
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(io_error(&dir))?;
        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&dir))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<ConversionRecord>(&path).await {
                Ok(Some(r)) if r.owner == owner => out.push(r),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }
        sort_newest_first(&mut out);
        Ok(out)
    }
}
