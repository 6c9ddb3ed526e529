//! Business Services
//!
//! - `FamilyService` - fetch → build → publish `TreeState`, member mutations
//! - `EditPolicy` - who may edit which record
//!
//! Services coordinate between the store layer and a UI shell. They own the
//! business rules; the tree builder and renderers stay pure.

pub mod error;
pub mod family_service;
pub mod policy;

pub use error::FamilyServiceError;
pub use family_service::{FamilyService, MemberDetails, TreeState};
pub use policy::{EditPolicy, OwnerOrAdmin};
