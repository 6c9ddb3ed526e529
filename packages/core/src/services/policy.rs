//! Edit authorization
//!
//! Decides whether a session may edit or delete a record. The predicate is passed
//! explicitly to the service and to the layout; nothing reads an ambient session.

use crate::models::{PersonRecord, Session};

pub trait EditPolicy: Send + Sync {
    fn can_edit(&self, session: &Session, record: &PersonRecord) -> bool;
}

/// Admins may edit anything; everyone else only what they created
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOrAdmin;

impl EditPolicy for OwnerOrAdmin {
    fn can_edit(&self, session: &Session, record: &PersonRecord) -> bool {
        session.is_admin || session.owns(record)
    }
}

impl<F> EditPolicy for F
where
    F: Fn(&Session, &PersonRecord) -> bool + Send + Sync,
{
    fn can_edit(&self, session: &Session, record: &PersonRecord) -> bool {
        self(session, record)
    }
}
