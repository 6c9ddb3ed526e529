//! RecordStore Trait - Person Record Persistence Boundary
//!
//! This module defines the `RecordStore` trait that abstracts the managed document
//! store holding person records. The tree core only ever reads a full, owner-scoped
//! snapshot from it; create/update/delete are followed by a full re-fetch.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so network-backed stores fit the same seam
//! 2. **Ownership Semantics**: Inputs are taken by value; callers clone if needed
//! 3. **Error Handling**: Uses `anyhow::Result`; concrete stores raise `StoreError`
//! 4. **Owner Scoping**: `fetch_owned_records` must only return the owner's records,
//!    in a stable order (the tree builder's sibling and root order follow it)
//!
//! # Examples
//!
//! ```rust,no_run
//! use familytree_core::db::{MemoryStore, RecordStore};
//! use familytree_core::models::{Gender, NewPerson, PersonRecord};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
//!
//!     let dob = NaiveDate::from_ymd_opt(1950, 3, 1).unwrap();
//!     let record = PersonRecord::from_new(NewPerson::new("Alice", dob, Gender::Female), "user-1");
//!     store.create_record(record).await?;
//!
//!     let mine = store.fetch_owned_records("user-1").await?;
//!     assert_eq!(mine.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::models::{DeleteResult, PersonRecord, PersonUpdate};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction over the document store holding person records
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a service holding
/// `Arc<dyn RecordStore>` can be shared across tasks.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record
    ///
    /// # Errors
    ///
    /// Returns error if a record with the same id already exists or the store
    /// cannot be written.
    async fn create_record(&self, record: PersonRecord) -> Result<PersonRecord>;

    /// Get a record by id
    ///
    /// - `Ok(Some(record))` if it exists
    /// - `Ok(None)` if it doesn't (not an error)
    /// - `Err(_)` if the store fails
    async fn get_record(&self, id: &str) -> Result<Option<PersonRecord>>;

    /// Apply a sparse update and return the full updated record
    ///
    /// # Errors
    ///
    /// Returns `StoreError::RecordNotFound` if the record doesn't exist.
    async fn update_record(&self, id: &str, update: PersonUpdate) -> Result<PersonRecord>;

    /// Delete a record (idempotent)
    async fn delete_record(&self, id: &str) -> Result<DeleteResult>;

    /// All records created by `owner_id`, in stable store order
    async fn fetch_owned_records(&self, owner_id: &str) -> Result<Vec<PersonRecord>>;
}
