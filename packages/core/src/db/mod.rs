//! Store Layer
//!
//! This module defines the seams to the external collaborators that hold data:
//!
//! - `RecordStore` - owner-scoped person record persistence
//! - `BlobStore` - portrait image storage
//!
//! and the implementations shipped with the core:
//!
//! - `MemoryStore` / `MemoryBlobStore` - in-process, for tests and tools
//! - `JsonFileStore` - single JSON document on disk
//!
//! The tree core never talks to a store directly; `FamilyService` fetches a full
//! snapshot and hands it to the builder.

mod blob_store;
mod error;
pub mod events;
mod json_file_store;
mod memory_store;
mod record_store;

pub use blob_store::{Blob, BlobStore, MemoryBlobStore};
pub use error::StoreError;
pub use events::MemberEvent;
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use record_store::RecordStore;
