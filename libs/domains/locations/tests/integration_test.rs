//! Integration tests for the Locations domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Foreign keys cascade deletes down the hierarchy
//! - Unique code indexes are enforced
//! - Ordering is applied by the queries

use domain_locations::*;
use test_utils::{assertions::*, TestDataBuilder, TestDatabase};
use uuid::Uuid;

fn region_input(builder: &TestDataBuilder, suffix: &str, name: &str) -> CreateRegion {
    CreateRegion {
        code: builder.code(suffix, 10),
        name_sw: name.to_string(),
        name_en: name.to_string(),
    }
}

#[tokio::test]
async fn test_create_and_get_region() {
    let db = TestDatabase::new().await;
    let repo = PgLocationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("region_create_get");

    let created = repo
        .create_region(region_input(&builder, "a", "Morogoro"))
        .await
        .unwrap();

    let fetched = assert_some(repo.get_region(created.id).await.unwrap(), "region");
    assert_uuid_eq(fetched.id, created.id, "region id");
    assert_eq!(fetched.name_en, "Morogoro");
}

#[tokio::test]
async fn test_duplicate_region_code() {
    let db = TestDatabase::new().await;
    let repo = PgLocationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("region_duplicate");

    repo.create_region(region_input(&builder, "a", "Tanga"))
        .await
        .unwrap();
    let result = repo.create_region(region_input(&builder, "a", "Tanga")).await;

    assert!(matches!(result, Err(LocationError::DuplicateCode(_))));
}

#[tokio::test]
async fn test_regions_listed_by_english_name() {
    let db = TestDatabase::new().await;
    let repo = PgLocationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("region_order");

    for (suffix, name) in [("m", "Mwanza"), ("a", "Arusha"), ("k", "Kigoma")] {
        repo.create_region(region_input(&builder, suffix, name))
            .await
            .unwrap();
    }

    let names: Vec<String> = repo
        .list_regions()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name_en)
        .collect();
    assert_eq!(names, vec!["Arusha", "Kigoma", "Mwanza"]);
}

#[tokio::test]
async fn test_missing_parent_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgLocationRepository::new(db.connection());
    let missing = Uuid::now_v7();

    let result = repo
        .create_street(
            missing,
            CreateStreet {
                name: "Mtaa".to_string(),
                description: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(LocationError::NotFound { kind: LocationKind::Ward, id }) if id == missing
    ));
}

#[tokio::test]
async fn test_delete_region_cascades() {
    let db = TestDatabase::new().await;
    let repo = PgLocationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("region_cascade");

    let region = repo
        .create_region(region_input(&builder, "r", "Iringa"))
        .await
        .unwrap();
    let district = repo
        .create_district(
            region.id,
            CreateDistrict {
                code: builder.code("d", 10),
                name_sw: "Kilolo".to_string(),
                name_en: "Kilolo".to_string(),
            },
        )
        .await
        .unwrap();
    let ward = repo
        .create_ward(
            district.id,
            CreateWard {
                code: builder.code("w", 20),
                name_sw: "Ilula".to_string(),
                name_en: "Ilula".to_string(),
                population: Some(15_000),
                area_sq_km: Some(120.5),
            },
        )
        .await
        .unwrap();
    let street = repo
        .create_street(
            ward.id,
            CreateStreet {
                name: "Mtaa wa Kati".to_string(),
                description: Some("Central".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(repo.get_ward(ward.id).await.unwrap(), Some(ward.clone()));

    assert!(repo.delete_region(region.id).await.unwrap());

    assert!(repo.get_district(district.id).await.unwrap().is_none());
    assert!(repo.get_ward(ward.id).await.unwrap().is_none());
    assert!(repo.get_street(street.id).await.unwrap().is_none());
    assert!(!repo.delete_region(region.id).await.unwrap());
}
