//! JSON File Store Tests
//!
//! Exercises the file-backed record store against real temp files: stored-data
//! quirks, persistence across instances, error reporting and owner scoping.

#[cfg(test)]
mod json_file_store_tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use familytree_core::db::{JsonFileStore, RecordStore, StoreError};
    use familytree_core::models::{Gender, NewPerson, PersonRecord, PersonUpdate};
    use serde_json::json;
    use tempfile::TempDir;

    fn new_record(name: &str, owner: &str) -> PersonRecord {
        let dob = NaiveDate::from_ymd_opt(1970, 4, 12).unwrap();
        PersonRecord::from_new(NewPerson::new(name, dob, Gender::Other), owner)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = JsonFileStore::new(temp_dir.path().join("nested").join("members.json"));

        assert!(store.fetch_owned_records("u1").await?.is_empty());
        assert!(store.get_record("anything").await?.is_none());
        assert!(!store.delete_record("anything").await?.existed);
        Ok(())
    }

    #[tokio::test]
    async fn test_records_persist_across_instances() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("data").join("members.json");

        let first = JsonFileStore::new(&path);
        let alice = first.create_record(new_record("Alice", "u1")).await?;
        let bob = first.create_record(new_record("Bob", "u1")).await?;
        first.create_record(new_record("Zed", "u2")).await?;

        let second = JsonFileStore::new(&path);
        let ids: Vec<String> = second
            .fetch_owned_records("u1")
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![alice.id.clone(), bob.id.clone()]);

        assert!(!path.with_extension("json.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_previously_stored_documents() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("members.json");
        let stored = json!([
            {
                "id": "m1",
                "name": "Grandma",
                "dateOfBirth": "1931-09-03",
                "gender": "female",
                "parentId": "",
                "spouseId": "",
                "createdBy": "u1",
                "createdAt": "2023-05-01T10:00:00Z",
                "updatedAt": "2023-05-01T10:00:00Z"
            },
            {
                "id": "m2",
                "name": "Dad",
                "dateOfBirth": "1958-12-24",
                "image": "portraits/u1/m2.jpg",
                "parentId": "m1",
                "createdBy": "u1",
                "createdAt": "2023-05-01T10:00:00Z",
                "updatedAt": "2023-05-01T10:00:00Z"
            }
        ]);
        std::fs::write(&path, serde_json::to_vec(&stored)?)?;

        let store = JsonFileStore::new(&path);
        let records = store.fetch_owned_records("u1").await?;

        assert_eq!(records.len(), 2);
        assert!(records[0].declares_root());
        assert!(records[0].spouse_ref().is_none());
        assert_eq!(records[1].gender, Gender::Other);
        assert_eq!(records[1].parent_ref(), Some("m1"));
        assert_eq!(
            records[1].image.as_ref().map(|i| i.as_str()),
            Some("portraits/u1/m2.jpg")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_round_through_disk() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("members.json");
        let store = JsonFileStore::new(&path);
        let record = store.create_record(new_record("Carol", "u1")).await?;

        let updated = store
            .update_record(
                &record.id,
                PersonUpdate::new()
                    .with_name("Caroline")
                    .with_occupation(Some("Pilot".to_string())),
            )
            .await?;
        assert_eq!(updated.name, "Caroline");

        let reread = JsonFileStore::new(&path).get_record(&record.id).await?;
        assert_eq!(reread, Some(updated));

        assert!(store.delete_record(&record.id).await?.existed);
        assert!(store.get_record(&record.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_store_errors_are_typed() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("members.json");
        let store = JsonFileStore::new(&path);
        let record = store.create_record(new_record("Dan", "u1")).await?;

        let duplicate = store.create_record(record.clone()).await.unwrap_err();
        assert!(matches!(
            duplicate.downcast_ref::<StoreError>(),
            Some(StoreError::DuplicateRecord { .. })
        ));

        let missing = store
            .update_record("nope", PersonUpdate::new().with_name("X"))
            .await
            .unwrap_err();
        assert!(matches!(
            missing.downcast_ref::<StoreError>(),
            Some(StoreError::RecordNotFound { .. })
        ));

        std::fs::write(&path, "{ not json")?;
        let corrupt = store.fetch_owned_records("u1").await.unwrap_err();
        assert!(matches!(
            corrupt.downcast_ref::<StoreError>(),
            Some(StoreError::Serialization(_))
        ));
        Ok(())
    }
}
