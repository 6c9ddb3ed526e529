//! BlobStore Trait - Portrait Image Storage Boundary
//!
//! Portrait images live in an external blob store. Records only carry an opaque
//! `PortraitRef`; resolving it back to bytes is the blob store's job.

use crate::db::StoreError;
use crate::models::PortraitRef;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Image bytes with their content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob for `owner_id` and return a reference to it
    async fn put(&self, owner_id: &str, blob: Blob) -> Result<PortraitRef>;

    /// Resolve a reference; `Ok(None)` if nothing is stored under it
    async fn get(&self, reference: &PortraitRef) -> Result<Option<Blob>>;

    /// Remove a blob (idempotent); returns whether it existed
    async fn delete(&self, reference: &PortraitRef) -> Result<bool>;
}

/// Blob store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Resolve a reference that must exist
    pub async fn require(&self, reference: &PortraitRef) -> Result<Blob> {
        self.get(reference)
            .await?
            .ok_or_else(|| StoreError::blob_not_found(reference.as_str()).into())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, owner_id: &str, blob: Blob) -> Result<PortraitRef> {
        let reference = PortraitRef::new(format!("portraits/{}/{}", owner_id, Uuid::new_v4()));
        self.blobs
            .write()
            .await
            .insert(reference.as_str().to_string(), blob);
        Ok(reference)
    }

    async fn get(&self, reference: &PortraitRef) -> Result<Option<Blob>> {
        Ok(self.blobs.read().await.get(reference.as_str()).cloned())
    }

    async fn delete(&self, reference: &PortraitRef) -> Result<bool> {
        Ok(self.blobs.write().await.remove(reference.as_str()).is_some())
    }
}
