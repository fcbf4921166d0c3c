//! In-process store: two maps behind async locks.
//!
//! Used by tests and by callers that only need history for the lifetime of
//! the process.

use super::{
    is_valid_id, sort_newest_first, BlobId, BlobMeta, BlobStore, ConversionLedger,
    ConversionRecord, StoredBlob,
};
use crate::error::StoreError;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<BlobId, StoredBlob>>,
    records: RwLock<HashMap<String, ConversionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }
}

impl BlobStore for MemoryStore {
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
        let blob = StoredBlob {
            meta: meta.clone(),
            bytes,
        };
        self.blobs.write().await.insert(meta.id.clone(), blob);
        Ok(meta)
    }

    async fn get(&self, id: &BlobId) -> Result<StoredBlob, StoreError> {
        self.blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "blob",
                id: id.to_string(),
            })
    }

    async fn delete(&self, id: &BlobId) -> Result<(), StoreError> {
        self.blobs
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind: "blob",
                id: id.to_string(),
            })
    }
}

impl ConversionLedger for MemoryStore {
    async fn insert(&self, record: ConversionRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn find(&self, owner: &str, id: &str) -> Result<Option<ConversionRecord>, StoreError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .filter(|r| r.owner == owner)
            .cloned())
    }

    async fn list(&self, owner: &str) -> Result<Vec<ConversionRecord>, StoreError> {
        let mut out: Vec<ConversionRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }
}
