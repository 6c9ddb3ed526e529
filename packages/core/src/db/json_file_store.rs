//! JSON file record store
//!
//! Persists all records as one JSON array on disk. Every call reads the current
//! file, so edits made by other processes are seen on the next fetch. Writes go to
//! a sibling temp file first and are then renamed over the original.
//!
//! A missing file is an empty store. The parent directory is created on first write.

use crate::db::{RecordStore, StoreError};
use crate::models::{DeleteResult, PersonRecord, PersonUpdate};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<PersonRecord>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    async fn save(&self, records: &[PersonRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, bytes)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn create_record(&self, record: PersonRecord) -> Result<PersonRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::duplicate_record(&record.id).into());
        }
        records.push(record.clone());
        self.save(&records).await?;
        Ok(record)
    }

    async fn get_record(&self, id: &str) -> Result<Option<PersonRecord>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    async fn update_record(&self, id: &str, update: PersonUpdate) -> Result<PersonRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::record_not_found(id))?;
        record.apply(update);
        let updated = record.clone();
        self.save(&records).await?;
        Ok(updated)
    }

    async fn delete_record(&self, id: &str) -> Result<DeleteResult> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(DeleteResult::not_found());
        }
        self.save(&records).await?;
        Ok(DeleteResult::existed())
    }

    async fn fetch_owned_records(&self, owner_id: &str) -> Result<Vec<PersonRecord>> {
        let records = self.load().await?;
        Ok(records
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .collect())
    }
}
