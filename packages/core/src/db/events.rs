//! Member Events
//!
//! Emitted by `FamilyService` after each successful mutation, over a tokio
//! broadcast channel. Subscribers (a UI shell, a sync worker) learn that the
//! record set changed without coupling to the store.
//!
//! # Event Flow
//!
//! 1. `FamilyService` writes through the `RecordStore`
//! 2. The forest is rebuilt from a full re-fetch
//! 3. The event is broadcast; subscribers re-read `TreeState` as needed

use crate::models::PersonRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MemberEvent {
    /// A new member was added
    Created { member: PersonRecord },

    /// A member was edited (including portrait changes)
    Updated { member: PersonRecord },

    /// A member was deleted
    #[serde(rename_all = "camelCase")]
    Deleted { member_id: String },
}

impl MemberEvent {
    /// Id of the member the event is about
    pub fn member_id(&self) -> &str {
        match self {
            MemberEvent::Created { member } | MemberEvent::Updated { member } => &member.id,
            MemberEvent::Deleted { member_id } => member_id,
        }
    }
}
