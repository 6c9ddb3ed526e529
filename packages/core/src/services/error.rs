//! Service Layer Error Types
//!
//! This module defines error types for family service operations. Store failures
//! are carried as text so they can be shown to the user for retry; none of them
//! is fatal to the process.

use crate::models::ValidationError;
use thiserror::Error;

/// Family service operation errors
#[derive(Error, Debug)]
pub enum FamilyServiceError {
    /// Member not found by ID (or not visible to this session)
    #[error("Member not found: {id}")]
    MemberNotFound { id: String },

    /// Session may not edit this member
    #[error("User {user_id} may not modify member {member_id}")]
    PermissionDenied { user_id: String, member_id: String },

    /// Validation failed for the input
    #[error("Member validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Parent reference does not resolve among the owner's members
    #[error("Invalid parent member: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Spouse reference does not resolve among the owner's members
    #[error("Invalid spouse member: {spouse_id}")]
    InvalidSpouse { spouse_id: String },

    /// Parent change would make a member its own ancestor
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },

    /// Record or blob store operation failed
    #[error("Store operation failed: {0}")]
    StoreFailed(String),

    /// Portrait operations need a blob store
    #[error("No portrait storage configured")]
    BlobStoreMissing,
}

impl FamilyServiceError {
    /// Create a member not found error
    pub fn member_not_found(id: impl Into<String>) -> Self {
        Self::MemberNotFound { id: id.into() }
    }

    /// Create a permission denied error
    pub fn permission_denied(user_id: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self::PermissionDenied {
            user_id: user_id.into(),
            member_id: member_id.into(),
        }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create an invalid spouse error
    pub fn invalid_spouse(spouse_id: impl Into<String>) -> Self {
        Self::InvalidSpouse {
            spouse_id: spouse_id.into(),
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }

    /// Create a store failed error
    pub fn store_failed(msg: impl Into<String>) -> Self {
        Self::StoreFailed(msg.into())
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreFailed(_))
    }
}
