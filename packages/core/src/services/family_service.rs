//! Family Service - Tree State and Member Mutations
//!
//! This module is the business logic layer between a UI shell and the stores:
//!
//! - Fetch the signed-in user's records, build the forest, publish [`TreeState`]
//! - Create, update and delete members (authorization, validation, reference checks)
//! - Portrait upload and resolution through an optional [`BlobStore`]
//! - Read models for the detail view and the edit form
//!
//! # Full re-fetch
//!
//! Every successful mutation is followed by a full re-fetch and rebuild. The
//! forest is never patched incrementally, so the published state is always the
//! builder's view of what the store holds.
//!
//! # Sessions
//!
//! The session is passed to every call that needs it. The service holds no
//! notion of a "current user".

use crate::config::FamilyTreeConfig;
use crate::db::{Blob, BlobStore, MemberEvent, RecordStore};
use crate::models::display::{age_on, format_long};
use crate::models::{
    DeleteResult, Forest, NewPerson, PersonRecord, PersonUpdate, PortraitRef, Session,
    ValidationError,
};
use crate::services::error::FamilyServiceError;
use crate::services::policy::{EditPolicy, OwnerOrAdmin};
use crate::tree::{build_forest_with, descendant_ids, layout_forest_with, BuildOptions};
use crate::tree::{ForestLayout, LayoutConfig};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Broadcast channel capacity for member events.
///
/// Subscribers only need to learn that something changed; lagging receivers
/// can re-read the state.
const MEMBER_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Observable state of the family tree
///
/// `Ready` with an empty forest means the user has no members yet. That is
/// distinct from `Failed` (the fetch did not succeed) and from `NotLoaded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TreeState {
    /// No fetch has completed yet
    NotLoaded,

    /// No session; nothing is fetched
    SignedOut,

    /// The last fetch failed; the message is user-presentable
    Failed { message: String },

    /// The last fetch succeeded
    Ready(Forest),
}

impl TreeState {
    pub fn forest(&self) -> Option<&Forest> {
        match self {
            TreeState::Ready(forest) => Some(forest),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TreeState::Ready(_))
    }

    /// Ready, but the user has no members
    pub fn has_no_members(&self) -> bool {
        self.forest().is_some_and(Forest::is_empty)
    }
}

/// Everything the member detail view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    pub member: PersonRecord,
    pub parent: Option<PersonRecord>,
    pub spouse: Option<PersonRecord>,
    pub children: Vec<PersonRecord>,
    pub age: u32,
    /// Long-form birth date, e.g. `Wednesday, March 1, 1950`
    pub born: String,
    pub can_edit: bool,
}

pub struct FamilyService {
    store: Arc<dyn RecordStore>,
    blobs: Option<Arc<dyn BlobStore>>,
    policy: Arc<dyn EditPolicy>,
    options: BuildOptions,
    state: RwLock<TreeState>,
    event_tx: broadcast::Sender<MemberEvent>,
}

impl FamilyService {
    /// Create a service over `store` with default build options and the
    /// owner-or-admin edit policy
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let (event_tx, _) = broadcast::channel(MEMBER_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            blobs: None,
            policy: Arc::new(OwnerOrAdmin),
            options: BuildOptions::default(),
            state: RwLock::new(TreeState::NotLoaded),
            event_tx,
        }
    }

    /// Create a service using the build options from a loaded configuration
    pub fn from_config(store: Arc<dyn RecordStore>, config: &FamilyTreeConfig) -> Self {
        Self::new(store).with_build_options(config.build_options())
    }

    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn EditPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_build_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Subscribe to member events emitted after successful mutations
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<MemberEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: MemberEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> TreeState {
        self.state.read().await.clone()
    }

    /// Whether `session` may edit or delete `record`
    pub fn can_edit(&self, session: &Session, record: &PersonRecord) -> bool {
        self.policy.can_edit(session, record)
    }

    /// Fetch the session's records, rebuild the forest and publish the new state
    ///
    /// Never fails: store errors become [`TreeState::Failed`] so the caller can
    /// offer a retry.
    pub async fn refresh(&self, session: Option<&Session>) -> TreeState {
        let next = match session {
            None => TreeState::SignedOut,
            Some(session) => match self.store.fetch_owned_records(&session.user_id).await {
                Ok(records) => {
                    let forest = build_forest_with(&records, self.options);
                    tracing::debug!(
                        "Loaded {} records for {} into {} trees",
                        records.len(),
                        session.user_id,
                        forest.len()
                    );
                    TreeState::Ready(forest)
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch records for {}: {}", session.user_id, e);
                    TreeState::Failed {
                        message: format!("Could not load family members: {}", e),
                    }
                }
            },
        };

        *self.state.write().await = next.clone();
        next
    }

    /// Lay out the current forest with edit actions bound to `session`
    ///
    /// Returns `None` unless the state is `Ready`.
    pub async fn layout(&self, session: &Session, config: &LayoutConfig) -> Option<ForestLayout> {
        let state = self.state.read().await;
        let forest = state.forest()?;
        Some(layout_forest_with(forest, config, |record| {
            self.can_edit(session, record)
        }))
    }

    /// Add a member owned by the session's user
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the input is invalid
    /// - `InvalidParent` / `InvalidSpouse` if a reference does not resolve among
    ///   the user's members
    /// - `StoreFailed` if the store rejects the write
    pub async fn add_member(
        &self,
        session: &Session,
        input: NewPerson,
    ) -> Result<PersonRecord, FamilyServiceError> {
        input.validate()?;

        let record = PersonRecord::from_new(input, session.user_id.as_str());
        let existing = self.owned_records(&record.owner_id).await?;
        check_reference_exists(&existing, record.parent_ref(), Reference::Parent)?;
        check_reference_exists(&existing, record.spouse_ref(), Reference::Spouse)?;

        let created = self
            .store
            .create_record(record)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))?;

        tracing::info!("Member {} added by {}", created.id, session.user_id);
        self.after_mutation(session, MemberEvent::Created {
            member: created.clone(),
        })
        .await;
        Ok(created)
    }

    /// Apply a sparse update to a member
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member does not exist or is not visible
    /// - `PermissionDenied` if the edit policy refuses
    /// - `ValidationFailed` for self references or an empty name
    /// - `InvalidParent` / `InvalidSpouse` for references that do not resolve
    /// - `CircularReference` if the new parent is one of the member's descendants
    pub async fn update_member(
        &self,
        session: &Session,
        id: &str,
        update: PersonUpdate,
    ) -> Result<PersonRecord, FamilyServiceError> {
        let record = self.editable_record(session, id).await?;
        update.validate_for(id)?;

        let parent = resulting_ref(update.parent_id.as_ref(), record.parent_ref());
        let spouse = resulting_ref(update.spouse_id.as_ref(), record.spouse_ref());
        if let (Some(parent), Some(spouse)) = (parent, spouse) {
            if parent == spouse {
                return Err(ValidationError::InvalidSpouse(format!(
                    "{} cannot be both parent and spouse",
                    spouse
                ))
                .into());
            }
        }

        if update.parent_id.is_some() || update.spouse_id.is_some() {
            let siblings = self.owned_records(&record.owner_id).await?;
            check_update_references(&siblings, id, &update)?;
        }

        let updated = self
            .store
            .update_record(id, update)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))?;

        tracing::info!("Member {} updated by {}", id, session.user_id);
        self.after_mutation(session, MemberEvent::Updated {
            member: updated.clone(),
        })
        .await;
        Ok(updated)
    }

    /// Delete a member (idempotent)
    ///
    /// Children of the deleted member keep their parent reference and become
    /// orphan roots on the next build. The member's portrait, if any, is removed
    /// from the blob store on a best-effort basis.
    pub async fn delete_member(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<DeleteResult, FamilyServiceError> {
        let record = match self.visible_record(session, id).await? {
            Some(record) => record,
            None => return Ok(DeleteResult::not_found()),
        };
        if !self.can_edit(session, &record) {
            return Err(FamilyServiceError::permission_denied(&session.user_id, id));
        }

        let result = self
            .store
            .delete_record(id)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))?;

        if let Some(image) = &record.image {
            self.discard_portrait(image).await;
        }

        tracing::info!("Member {} deleted by {}", id, session.user_id);
        self.after_mutation(session, MemberEvent::Deleted {
            member_id: id.to_string(),
        })
        .await;
        Ok(result)
    }

    /// Upload a portrait for a member and point the record at it
    ///
    /// The previous portrait, if any, is removed once the record is updated.
    pub async fn set_portrait(
        &self,
        session: &Session,
        id: &str,
        blob: Blob,
    ) -> Result<PersonRecord, FamilyServiceError> {
        let blobs = self
            .blobs
            .as_ref()
            .ok_or(FamilyServiceError::BlobStoreMissing)?;
        let record = self.editable_record(session, id).await?;

        let reference = blobs
            .put(&record.owner_id, blob)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))?;

        let updated = match self
            .store
            .update_record(id, PersonUpdate::new().with_image(Some(reference.clone())))
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_portrait(&reference).await;
                return Err(FamilyServiceError::store_failed(e.to_string()));
            }
        };

        if let Some(previous) = &record.image {
            self.discard_portrait(previous).await;
        }

        tracing::info!("Portrait for member {} replaced by {}", id, session.user_id);
        self.after_mutation(session, MemberEvent::Updated {
            member: updated.clone(),
        })
        .await;
        Ok(updated)
    }

    /// Resolve a member's portrait
    ///
    /// `Ok(None)` when the member has no portrait or the blob is gone.
    pub async fn portrait(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<Option<Blob>, FamilyServiceError> {
        let record = self
            .visible_record(session, id)
            .await?
            .ok_or_else(|| FamilyServiceError::member_not_found(id))?;

        let (Some(reference), Some(blobs)) = (&record.image, &self.blobs) else {
            return Ok(None);
        };

        blobs
            .get(reference)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))
    }

    /// Read model for the member detail view
    pub async fn member_details(
        &self,
        session: &Session,
        id: &str,
        today: NaiveDate,
    ) -> Result<MemberDetails, FamilyServiceError> {
        let member = self
            .visible_record(session, id)
            .await?
            .ok_or_else(|| FamilyServiceError::member_not_found(id))?;
        let records = self.owned_records(&member.owner_id).await?;

        let find = |target: Option<&str>| {
            target.and_then(|target| records.iter().find(|r| r.id == target).cloned())
        };
        let parent = find(member.parent_ref());
        let spouse = find(member.spouse_ref());
        let children = records
            .iter()
            .filter(|r| r.parent_ref() == Some(id))
            .cloned()
            .collect();

        Ok(MemberDetails {
            age: age_on(member.date_of_birth, today),
            born: format_long(member.date_of_birth),
            can_edit: self.can_edit(session, &member),
            parent,
            spouse,
            children,
            member,
        })
    }

    /// Members the edit form may offer as parent
    ///
    /// When editing an existing member, candidates come from that member's
    /// owner, and the member itself and its descendants are left out since
    /// choosing them would close a cycle.
    pub async fn parent_candidates(
        &self,
        session: &Session,
        editing: Option<&str>,
    ) -> Result<Vec<PersonRecord>, FamilyServiceError> {
        let records = self.candidate_pool(session, editing).await?;
        let Some(editing) = editing else {
            return Ok(records);
        };

        let below = descendant_ids(&records, editing);
        let candidates = records
            .iter()
            .filter(|r| r.id != editing && !below.contains(r.id.as_str()))
            .cloned()
            .collect();
        Ok(candidates)
    }

    /// Members the edit form may offer as spouse
    ///
    /// Leaves out the member being edited, the chosen parent, and anyone already
    /// married to someone else.
    pub async fn spouse_candidates(
        &self,
        session: &Session,
        editing: Option<&str>,
        chosen_parent: Option<&str>,
    ) -> Result<Vec<PersonRecord>, FamilyServiceError> {
        let records = self.candidate_pool(session, editing).await?;

        let candidates = records
            .into_iter()
            .filter(|r| Some(r.id.as_str()) != editing)
            .filter(|r| Some(r.id.as_str()) != chosen_parent)
            .filter(|r| match r.spouse_ref() {
                None => true,
                Some(spouse) => editing == Some(spouse),
            })
            .collect();
        Ok(candidates)
    }

    /// Records of the owner whose member is being edited, or the session's own
    async fn candidate_pool(
        &self,
        session: &Session,
        editing: Option<&str>,
    ) -> Result<Vec<PersonRecord>, FamilyServiceError> {
        let Some(editing) = editing else {
            return self.owned_records(&session.user_id).await;
        };
        let record = self
            .visible_record(session, editing)
            .await?
            .ok_or_else(|| FamilyServiceError::member_not_found(editing))?;
        self.owned_records(&record.owner_id).await
    }

    async fn owned_records(&self, owner_id: &str) -> Result<Vec<PersonRecord>, FamilyServiceError> {
        self.store
            .fetch_owned_records(owner_id)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))
    }

    /// A record the session may see: its own, or any record for admins
    async fn visible_record(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<Option<PersonRecord>, FamilyServiceError> {
        let record = self
            .store
            .get_record(id)
            .await
            .map_err(|e| FamilyServiceError::store_failed(e.to_string()))?;
        Ok(record.filter(|r| session.is_admin || session.owns(r)))
    }

    async fn editable_record(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<PersonRecord, FamilyServiceError> {
        let record = self
            .visible_record(session, id)
            .await?
            .ok_or_else(|| FamilyServiceError::member_not_found(id))?;
        if !self.can_edit(session, &record) {
            return Err(FamilyServiceError::permission_denied(&session.user_id, id));
        }
        Ok(record)
    }

    async fn discard_portrait(&self, reference: &PortraitRef) {
        let Some(blobs) = &self.blobs else {
            return;
        };
        if let Err(e) = blobs.delete(reference).await {
            tracing::warn!("Failed to delete portrait {}: {}", reference, e);
        }
    }

    async fn after_mutation(&self, session: &Session, event: MemberEvent) {
        self.refresh(Some(session)).await;
        self.emit_event(event);
    }
}

#[derive(Clone, Copy)]
enum Reference {
    Parent,
    Spouse,
}

fn check_reference_exists(
    records: &[PersonRecord],
    target: Option<&str>,
    kind: Reference,
) -> Result<(), FamilyServiceError> {
    let Some(target) = target else {
        return Ok(());
    };
    if records.iter().any(|r| r.id == target) {
        return Ok(());
    }
    Err(match kind {
        Reference::Parent => FamilyServiceError::invalid_parent(target),
        Reference::Spouse => FamilyServiceError::invalid_spouse(target),
    })
}

/// Reference after applying a sparse change; an empty id clears it
fn resulting_ref<'a>(
    change: Option<&'a Option<String>>,
    current: Option<&'a str>,
) -> Option<&'a str> {
    match change {
        Some(value) => value.as_deref().filter(|v| !v.trim().is_empty()),
        None => current,
    }
}

fn check_update_references(
    records: &[PersonRecord],
    id: &str,
    update: &PersonUpdate,
) -> Result<(), FamilyServiceError> {
    let new_parent = update.parent_id.as_ref().and_then(|p| p.as_deref());
    let new_spouse = update.spouse_id.as_ref().and_then(|s| s.as_deref());
    let new_parent = new_parent.filter(|p| !p.trim().is_empty());
    let new_spouse = new_spouse.filter(|s| !s.trim().is_empty());

    check_reference_exists(records, new_parent, Reference::Parent)?;
    check_reference_exists(records, new_spouse, Reference::Spouse)?;

    if let Some(parent) = new_parent {
        if descendant_ids(records, id).contains(parent) {
            return Err(FamilyServiceError::circular_reference(format!(
                "{} cannot become the parent of its ancestor {}",
                parent, id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "family_service_test.rs"]
mod family_service_test;
