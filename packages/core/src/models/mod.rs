//! Data Models
//!
//! This module contains the data structures used throughout the family tree core:
//!
//! - `PersonRecord` - Immutable snapshot of one family member
//! - `NewPerson` / `PersonUpdate` - Create and sparse-update inputs
//! - `Session` - Signed-in user supplied by the auth service
//! - `TreeNode` / `Forest` - Derived hierarchy rebuilt on every fetch

pub mod display;
mod person;
mod session;
mod tree_node;

pub use person::{
    DeleteResult, Gender, NewPerson, PersonRecord, PersonUpdate, PortraitRef, ValidationError,
};
pub use session::Session;
pub use tree_node::{Forest, PreOrder, TreeNode};
