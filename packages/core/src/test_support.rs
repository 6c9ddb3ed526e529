//! Shared fixtures for unit tests

use crate::models::{Gender, PersonRecord};
use chrono::{NaiveDate, TimeZone, Utc};

/// Record with fixed dates, owned by `owner`
pub(crate) fn person(id: &str, parent: Option<&str>, spouse: Option<&str>) -> PersonRecord {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    PersonRecord {
        id: id.to_string(),
        name: format!("Person {}", id),
        date_of_birth: NaiveDate::from_ymd_opt(1960, 6, 15).unwrap(),
        gender: Gender::Other,
        image: None,
        parent_id: parent.map(str::to_string),
        spouse_id: spouse.map(str::to_string),
        owner_id: "owner".to_string(),
        email: None,
        phone: None,
        address: None,
        occupation: None,
        bio: None,
        created_at: stamp,
        updated_at: stamp,
    }
}
