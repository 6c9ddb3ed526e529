//! Store Error Types
//!
//! This module defines error types for record and blob store operations.
//! Store traits return `anyhow::Result`; concrete stores raise these errors so
//! callers can downcast when they need to tell failure kinds apart.

use std::path::PathBuf;
use thiserror::Error;

/// Record/blob store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record not found by ID
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    /// Record with this ID already exists
    #[error("Record already exists: {id}")]
    DuplicateRecord { id: String },

    /// Backing store cannot be reached (network-backed stores, offline mode)
    ///
    /// The bundled stores are local and never raise this; remote
    /// implementations of `RecordStore` and `BlobStore` should.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Failed to read or write the backing file
    #[error("Store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored document could not be (de)serialized
    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blob reference does not resolve
    #[error("Blob not found: {reference}")]
    BlobNotFound { reference: String },
}

impl StoreError {
    /// Create a record not found error
    pub fn record_not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }

    /// Create a duplicate record error
    pub fn duplicate_record(id: impl Into<String>) -> Self {
        Self::DuplicateRecord { id: id.into() }
    }

    /// Create a store unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a blob not found error
    pub fn blob_not_found(reference: impl Into<String>) -> Self {
        Self::BlobNotFound {
            reference: reference.into(),
        }
    }
}
