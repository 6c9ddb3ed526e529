//! Family Tree Core
//!
//! This crate turns a flat, owner-scoped list of person records into a family
//! forest and lays that forest out for display.
//!
//! # Architecture
//!
//! - **Derived hierarchy**: Records only carry `parentId` / `spouseId` references.
//!   The forest is rebuilt from a full snapshot on every fetch, never patched.
//! - **Pure core**: The builder and both renderers are pure functions of their input.
//! - **External collaborators behind traits**: Record storage, portrait storage and
//!   authentication live outside the crate, behind `RecordStore`, `BlobStore` and
//!   an explicitly passed `Session`.
//!
//! # Modules
//!
//! - [`models`] - Data structures (PersonRecord, Session, TreeNode, Forest)
//! - [`tree`] - Forest construction, geometric layout and text rendering
//! - [`db`] - Store traits and the memory / JSON file implementations
//! - [`services`] - FamilyService: tree state and member mutations
//! - [`config`] - Configuration file loading

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod tree;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{ConfigError, FamilyTreeConfig};
pub use models::*;
pub use services::*;
pub use tree::{build_forest, build_forest_with, layout_forest, render_text, LayoutConfig};
