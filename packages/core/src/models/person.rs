//! Person Record Data Structures
//!
//! This module defines `PersonRecord`, the immutable snapshot of one family member
//! as returned by a record store, plus the create/update inputs accepted at the
//! store boundary.
//!
//! # Structural vs display fields
//!
//! Only `id`, `parent_id` and `spouse_id` shape the tree. Everything else (name,
//! dates, gender, portrait, contact details, biography) is display data and never
//! influences construction order or validity.
//!
//! # Stored shape
//!
//! Records serialize camelCase. Two quirks of previously stored data are absorbed
//! on deserialization:
//!
//! - Empty strings in reference and optional text fields mean "not set"
//! - A missing `gender` (older records carried a portrait instead) becomes `Other`
//!
//! # Examples
//!
//! ```rust
//! use familytree_core::models::{Gender, NewPerson};
//! use chrono::NaiveDate;
//!
//! let input = NewPerson::new(
//!     "Ada Lovelace",
//!     NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
//!     Gender::Female,
//! )
//! .with_occupation("Mathematician");
//!
//! assert!(input.validate().is_ok());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for person create/update operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid person ID: {0}")]
    InvalidId(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid spouse reference: {0}")]
    InvalidSpouse(String),
}

/// Gender classification (display only, no structural effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to a portrait image held by a blob store
///
/// The core never interprets the reference; it is handed back to the blob store
/// for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortraitRef(pub String);

impl PortraitRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PortraitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Treat `""` (and whitespace-only strings) as an absent value
fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Accept either a value or null for clearable fields in sparse updates
///
/// Missing field is handled by `#[serde(default)]` on the struct field.
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Immutable snapshot of one family member.
///
/// # Fields
///
/// - `id`: Opaque unique identifier
/// - `name`: Display name, non-empty
/// - `date_of_birth`: Calendar date, display and age computation only
/// - `gender`: Classification only
/// - `image`: Optional portrait reference (resolved through a blob store)
/// - `parent_id`: Optional parent reference; absent means structural root
/// - `spouse_id`: Optional spouse reference; need not be stored symmetrically
/// - `owner_id`: User who created the record (query scoping and edit rights only)
/// - contact and biography fields: display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: String,

    pub name: String,

    pub date_of_birth: NaiveDate,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PortraitRef>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub parent_id: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub spouse_id: Option<String>,

    /// Stored as `createdBy` for compatibility with existing documents
    #[serde(rename = "createdBy", alias = "ownerId")]
    pub owner_id: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub email: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub phone: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub address: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub occupation: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub bio: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl PersonRecord {
    /// Materialize a validated `NewPerson` into a record owned by `owner_id`
    ///
    /// Generates a fresh UUID and stamps both timestamps with the current time.
    pub fn from_new(input: NewPerson, owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            image: input.image,
            parent_id: non_empty(input.parent_id),
            spouse_id: non_empty(input.spouse_id),
            owner_id: owner_id.into(),
            email: non_empty(input.email),
            phone: non_empty(input.phone),
            address: non_empty(input.address),
            occupation: non_empty(input.occupation),
            bio: non_empty(input.bio),
            created_at: now,
            updated_at: now,
        }
    }

    /// Parent reference, if one is set
    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Spouse reference, if one is set
    pub fn spouse_ref(&self) -> Option<&str> {
        self.spouse_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether this record declares no parent at all
    pub fn declares_root(&self) -> bool {
        self.parent_ref().is_none()
    }

    /// Apply a sparse update in place and bump `updated_at`
    pub fn apply(&mut self, update: PersonUpdate) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = non_empty(parent_id);
        }
        if let Some(spouse_id) = update.spouse_id {
            self.spouse_id = non_empty(spouse_id);
        }
        if let Some(email) = update.email {
            self.email = non_empty(email);
        }
        if let Some(phone) = update.phone {
            self.phone = non_empty(phone);
        }
        if let Some(address) = update.address {
            self.address = non_empty(address);
        }
        if let Some(occupation) = update.occupation {
            self.occupation = non_empty(occupation);
        }
        if let Some(bio) = update.bio {
            self.bio = non_empty(bio);
        }
        self.updated_at = Utc::now();
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Input for creating a person record
///
/// The owner is not part of the input; it is taken from the session performing
/// the create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PortraitRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, date_of_birth: NaiveDate, gender: Gender) -> Self {
        Self {
            name: name.into(),
            date_of_birth,
            gender,
            image: None,
            parent_id: None,
            spouse_id: None,
            email: None,
            phone: None,
            address: None,
            occupation: None,
            bio: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_spouse(mut self, spouse_id: impl Into<String>) -> Self {
        self.spouse_id = Some(spouse_id.into());
        self
    }

    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Validate the input before it reaches a store
    ///
    /// Checks that the name is present and that the spouse is not also the
    /// chosen parent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        let parent = self.parent_id.as_deref().filter(|s| !s.trim().is_empty());
        let spouse = self.spouse_id.as_deref().filter(|s| !s.trim().is_empty());
        if let (Some(parent), Some(spouse)) = (parent, spouse) {
            if parent == spouse {
                return Err(ValidationError::InvalidSpouse(format!(
                    "{} cannot be both parent and spouse",
                    spouse
                )));
            }
        }

        Ok(())
    }
}

/// Partial person update for PATCH-style edits
///
/// Only provided fields are changed. Clearable fields use the double-Option pattern:
/// - `None`: leave unchanged
/// - `Some(None)`: clear the field
/// - `Some(Some(v))`: set the field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub image: Option<Option<PortraitRef>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub spouse_id: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub email: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub phone: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub address: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub occupation: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub bio: Option<Option<String>>,
}

impl PersonUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_spouse(mut self, spouse_id: Option<String>) -> Self {
        self.spouse_id = Some(spouse_id);
        self
    }

    pub fn with_image(mut self, image: Option<PortraitRef>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_occupation(mut self, occupation: Option<String>) -> Self {
        self.occupation = Some(occupation);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate the update against the record it will be applied to
    pub fn validate_for(&self, record_id: &str) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()));
            }
        }

        let parent = self.parent_id.as_ref().and_then(|p| p.as_deref());
        let spouse = self.spouse_id.as_ref().and_then(|s| s.as_deref());

        if parent == Some(record_id) {
            return Err(ValidationError::InvalidParent(format!(
                "{} cannot be its own parent",
                record_id
            )));
        }
        if spouse == Some(record_id) {
            return Err(ValidationError::InvalidSpouse(format!(
                "{} cannot be its own spouse",
                record_id
            )));
        }
        if let (Some(parent), Some(spouse)) = (parent, spouse) {
            if !parent.is_empty() && parent == spouse {
                return Err(ValidationError::InvalidSpouse(format!(
                    "{} cannot be both parent and spouse",
                    spouse
                )));
            }
        }

        Ok(())
    }
}

/// Result of a delete operation
///
/// Deleting a record that does not exist is an idempotent success.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    /// Whether the record existed before deletion
    pub existed: bool,
}

impl DeleteResult {
    pub fn existed() -> Self {
        Self { existed: true }
    }

    pub fn not_found() -> Self {
        Self { existed: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(1950, 3, 1).unwrap()
    }

    #[test]
    fn test_from_new_trims_and_drops_empty_fields() {
        let mut input = NewPerson::new("  Alice  ", dob(), Gender::Female).with_parent("");
        input.bio = Some("   ".to_string());
        input.occupation = Some("Teacher".to_string());

        let record = PersonRecord::from_new(input, "user-1");

        assert_eq!(record.name, "Alice");
        assert_eq!(record.owner_id, "user-1");
        assert!(record.parent_id.is_none());
        assert!(record.bio.is_none());
        assert_eq!(record.occupation.as_deref(), Some("Teacher"));
        assert_eq!(record.created_at, record.updated_at);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_deserialize_stored_document() {
        let value = json!({
            "id": "m1",
            "name": "Bob",
            "dateOfBirth": "1948-07-12",
            "gender": "male",
            "parentId": "",
            "spouseId": "m2",
            "email": "",
            "createdBy": "user-1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        });

        let record: PersonRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.gender, Gender::Male);
        assert!(record.parent_id.is_none());
        assert!(record.declares_root());
        assert_eq!(record.spouse_ref(), Some("m2"));
        assert!(record.email.is_none());
        assert_eq!(record.owner_id, "user-1");
    }

    #[test]
    fn test_deserialize_older_schema_with_portrait() {
        let value = json!({
            "id": "m1",
            "name": "Carol",
            "dateOfBirth": "1975-11-30",
            "imageUrl": "ignored-unknown-field",
            "image": "portraits/m1.jpg",
            "ownerId": "user-9",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let record: PersonRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.gender, Gender::Other);
        assert_eq!(record.image, Some(PortraitRef::new("portraits/m1.jpg")));
        assert_eq!(record.owner_id, "user-9");
    }

    #[test]
    fn test_serialize_uses_stored_owner_name() {
        let record = PersonRecord::from_new(NewPerson::new("Dan", dob(), Gender::Male), "u");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["createdBy"], "u");
        assert_eq!(value["dateOfBirth"], "1950-03-01");
        assert!(value.get("parentId").is_none());
    }

    #[test]
    fn test_new_person_validation() {
        assert_eq!(
            NewPerson::new("   ", dob(), Gender::Other).validate(),
            Err(ValidationError::MissingField("name".to_string()))
        );

        let same = NewPerson::new("Eve", dob(), Gender::Female)
            .with_parent("p1")
            .with_spouse("p1");
        assert!(matches!(
            same.validate(),
            Err(ValidationError::InvalidSpouse(_))
        ));

        let ok = NewPerson::new("Eve", dob(), Gender::Female)
            .with_parent("p1")
            .with_spouse("p2");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_update_validation_rejects_self_references() {
        let update = PersonUpdate::new().with_parent(Some("m1".to_string()));
        assert!(matches!(
            update.validate_for("m1"),
            Err(ValidationError::InvalidParent(_))
        ));

        let update = PersonUpdate::new().with_spouse(Some("m1".to_string()));
        assert!(matches!(
            update.validate_for("m1"),
            Err(ValidationError::InvalidSpouse(_))
        ));

        let update = PersonUpdate::new().with_name("");
        assert!(update.validate_for("m1").is_err());

        assert!(PersonUpdate::new().with_parent(None).validate_for("m1").is_ok());
    }

    #[test]
    fn test_apply_update() {
        let mut record = PersonRecord::from_new(
            NewPerson::new("Frank", dob(), Gender::Male)
                .with_parent("p1")
                .with_occupation("Baker"),
            "u",
        );
        let before = record.updated_at;

        record.apply(
            PersonUpdate::new()
                .with_name("Franklin")
                .with_parent(None)
                .with_occupation(Some(String::new())),
        );

        assert_eq!(record.name, "Franklin");
        assert!(record.parent_id.is_none());
        assert!(record.occupation.is_none());
        assert!(record.updated_at >= before);
    }

    #[test]
    fn test_update_double_option_deserialization() {
        let update: PersonUpdate =
            serde_json::from_value(json!({ "parentId": null, "name": "G" })).unwrap();
        assert_eq!(update.parent_id, Some(None));
        assert_eq!(update.spouse_id, None);
        assert!(!update.is_empty());

        let empty: PersonUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());
    }
}
