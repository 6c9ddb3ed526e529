//! In-memory record store
//!
//! Keeps records in insertion order behind a tokio `RwLock`. Used by tests and by
//! tools that load a snapshot once and work on it in memory.

use crate::db::{RecordStore, StoreError};
use crate::models::{DeleteResult, PersonRecord, PersonUpdate};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<PersonRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, keeping their order
    pub fn with_records(records: Vec<PersonRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_record(&self, record: PersonRecord) -> Result<PersonRecord> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::duplicate_record(&record.id).into());
        }
        records.push(record.clone());
        tracing::debug!("Created record {} for owner {}", record.id, record.owner_id);
        Ok(record)
    }

    async fn get_record(&self, id: &str) -> Result<Option<PersonRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update_record(&self, id: &str, update: PersonUpdate) -> Result<PersonRecord> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::record_not_found(id))?;
        record.apply(update);
        Ok(record.clone())
    }

    async fn delete_record(&self, id: &str) -> Result<DeleteResult> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(if records.len() < before {
            DeleteResult::existed()
        } else {
            DeleteResult::not_found()
        })
    }

    async fn fetch_owned_records(&self, owner_id: &str) -> Result<Vec<PersonRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
