use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{LocationError, LocationKind, LocationResult};
use crate::models::{
    CreateDistrict, CreateRegion, CreateStreet, CreateWard, District, Region, Street, Ward,
};

/// Repository trait for the location hierarchy
///
/// Creating a child under a missing parent fails with `NotFound`.
/// Deleting a parent removes every descendant.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create_region(&self, input: CreateRegion) -> LocationResult<Region>;
    async fn get_region(&self, id: Uuid) -> LocationResult<Option<Region>>;
    /// Regions ordered by English name
    async fn list_regions(&self) -> LocationResult<Vec<Region>>;
    async fn delete_region(&self, id: Uuid) -> LocationResult<bool>;

    async fn create_district(
        &self,
        region_id: Uuid,
        input: CreateDistrict,
    ) -> LocationResult<District>;
    async fn get_district(&self, id: Uuid) -> LocationResult<Option<District>>;
    async fn list_districts(&self, region_id: Uuid) -> LocationResult<Vec<District>>;
    async fn delete_district(&self, id: Uuid) -> LocationResult<bool>;

    async fn create_ward(&self, district_id: Uuid, input: CreateWard) -> LocationResult<Ward>;
    async fn get_ward(&self, id: Uuid) -> LocationResult<Option<Ward>>;
    async fn list_wards(&self, district_id: Uuid) -> LocationResult<Vec<Ward>>;
    /// Removes the ward with its streets. Users pointing at it keep their
    /// row and lose the assignment (enforced by the store).
    async fn delete_ward(&self, id: Uuid) -> LocationResult<bool>;

    async fn create_street(&self, ward_id: Uuid, input: CreateStreet) -> LocationResult<Street>;
    async fn get_street(&self, id: Uuid) -> LocationResult<Option<Street>>;
    /// Streets ordered by name
    async fn list_streets(&self, ward_id: Uuid) -> LocationResult<Vec<Street>>;
    async fn delete_street(&self, id: Uuid) -> LocationResult<bool>;
}

#[derive(Debug, Default)]
struct Hierarchy {
    regions: HashMap<Uuid, Region>,
    districts: HashMap<Uuid, District>,
    wards: HashMap<Uuid, Ward>,
    streets: HashMap<Uuid, Street>,
}

impl Hierarchy {
    fn remove_ward(&mut self, id: Uuid) -> bool {
        if self.wards.remove(&id).is_none() {
            return false;
        }
        self.streets.retain(|_, s| s.ward_id != id);
        true
    }

    fn remove_district(&mut self, id: Uuid) -> bool {
        if self.districts.remove(&id).is_none() {
            return false;
        }
        let ward_ids: Vec<Uuid> = self
            .wards
            .values()
            .filter(|w| w.district_id == id)
            .map(|w| w.id)
            .collect();
        for ward_id in ward_ids {
            self.remove_ward(ward_id);
        }
        true
    }

    fn remove_region(&mut self, id: Uuid) -> bool {
        if self.regions.remove(&id).is_none() {
            return false;
        }
        let district_ids: Vec<Uuid> = self
            .districts
            .values()
            .filter(|d| d.region_id == id)
            .map(|d| d.id)
            .collect();
        for district_id in district_ids {
            self.remove_district(district_id);
        }
        true
    }
}

/// In-memory implementation of LocationRepository (for development/testing)
///
/// Codes are unique per level. The check and the insert happen under the
/// same write lock.
///
/// Deletes cascade down the hierarchy only. This store does not see user
/// rows, so users of a removed ward keep their `ward_id`; Postgres clears it
/// through `ON DELETE SET NULL`. The API binary always runs on
/// `PgLocationRepository`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLocationRepository {
    state: Arc<RwLock<Hierarchy>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn create_region(&self, input: CreateRegion) -> LocationResult<Region> {
        let mut state = self.state.write().await;

        if state.regions.values().any(|r| r.code == input.code) {
            return Err(LocationError::DuplicateCode(input.code));
        }

        let region = Region::new(input);
        state.regions.insert(region.id, region.clone());

        tracing::info!(region_id = %region.id, code = %region.code, "Created region");
        Ok(region)
    }

    async fn get_region(&self, id: Uuid) -> LocationResult<Option<Region>> {
        Ok(self.state.read().await.regions.get(&id).cloned())
    }

    async fn list_regions(&self) -> LocationResult<Vec<Region>> {
        let state = self.state.read().await;
        let regions: Vec<Region> = state.regions.values().cloned().collect();
        Ok(sorted_by(regions, |r: &Region| r.name_en.clone()))
    }

    async fn delete_region(&self, id: Uuid) -> LocationResult<bool> {
        let removed = self.state.write().await.remove_region(id);
        if removed {
            tracing::info!(region_id = %id, "Deleted region");
        }
        Ok(removed)
    }

    async fn create_district(
        &self,
        region_id: Uuid,
        input: CreateDistrict,
    ) -> LocationResult<District> {
        let mut state = self.state.write().await;

        if !state.regions.contains_key(&region_id) {
            return Err(LocationError::not_found(LocationKind::Region, region_id));
        }
        if state.districts.values().any(|d| d.code == input.code) {
            return Err(LocationError::DuplicateCode(input.code));
        }

        let district = District::new(region_id, input);
        state.districts.insert(district.id, district.clone());

        tracing::info!(district_id = %district.id, %region_id, "Created district");
        Ok(district)
    }

    async fn get_district(&self, id: Uuid) -> LocationResult<Option<District>> {
        Ok(self.state.read().await.districts.get(&id).cloned())
    }

    async fn list_districts(&self, region_id: Uuid) -> LocationResult<Vec<District>> {
        let state = self.state.read().await;
        let districts: Vec<District> = state
            .districts
            .values()
            .filter(|d| d.region_id == region_id)
            .cloned()
            .collect();
        Ok(sorted_by(districts, |d: &District| d.name_en.clone()))
    }

    async fn delete_district(&self, id: Uuid) -> LocationResult<bool> {
        let removed = self.state.write().await.remove_district(id);
        if removed {
            tracing::info!(district_id = %id, "Deleted district");
        }
        Ok(removed)
    }

    async fn create_ward(&self, district_id: Uuid, input: CreateWard) -> LocationResult<Ward> {
        let mut state = self.state.write().await;

        if !state.districts.contains_key(&district_id) {
            return Err(LocationError::not_found(LocationKind::District, district_id));
        }
        if state.wards.values().any(|w| w.code == input.code) {
            return Err(LocationError::DuplicateCode(input.code));
        }

        let ward = Ward::new(district_id, input);
        state.wards.insert(ward.id, ward.clone());

        tracing::info!(ward_id = %ward.id, %district_id, "Created ward");
        Ok(ward)
    }

    async fn get_ward(&self, id: Uuid) -> LocationResult<Option<Ward>> {
        Ok(self.state.read().await.wards.get(&id).cloned())
    }

    async fn list_wards(&self, district_id: Uuid) -> LocationResult<Vec<Ward>> {
        let state = self.state.read().await;
        let wards: Vec<Ward> = state
            .wards
            .values()
            .filter(|w| w.district_id == district_id)
            .cloned()
            .collect();
        Ok(sorted_by(wards, |w: &Ward| w.name_en.clone()))
    }

    async fn delete_ward(&self, id: Uuid) -> LocationResult<bool> {
        let removed = self.state.write().await.remove_ward(id);
        if removed {
            tracing::info!(ward_id = %id, "Deleted ward");
        }
        Ok(removed)
    }

    async fn create_street(&self, ward_id: Uuid, input: CreateStreet) -> LocationResult<Street> {
        let mut state = self.state.write().await;

        if !state.wards.contains_key(&ward_id) {
            return Err(LocationError::not_found(LocationKind::Ward, ward_id));
        }

        let street = Street::new(ward_id, input);
        state.streets.insert(street.id, street.clone());

        tracing::info!(street_id = %street.id, %ward_id, "Created street");
        Ok(street)
    }

    async fn get_street(&self, id: Uuid) -> LocationResult<Option<Street>> {
        Ok(self.state.read().await.streets.get(&id).cloned())
    }

    async fn list_streets(&self, ward_id: Uuid) -> LocationResult<Vec<Street>> {
        let state = self.state.read().await;
        let streets: Vec<Street> = state
            .streets
            .values()
            .filter(|s| s.ward_id == ward_id)
            .cloned()
            .collect();
        Ok(sorted_by(streets, |s: &Street| s.name.clone()))
    }

    async fn delete_street(&self, id: Uuid) -> LocationResult<bool> {
        let removed = self.state.write().await.streets.remove(&id).is_some();
        if removed {
            tracing::info!(street_id = %id, "Deleted street");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_input(code: &str, name: &str) -> CreateRegion {
        CreateRegion {
            code: code.to_string(),
            name_sw: name.to_string(),
            name_en: name.to_string(),
        }
    }

    fn district_input(code: &str, name: &str) -> CreateDistrict {
        CreateDistrict {
            code: code.to_string(),
            name_sw: name.to_string(),
            name_en: name.to_string(),
        }
    }

    fn ward_input(code: &str, name: &str) -> CreateWard {
        CreateWard {
            code: code.to_string(),
            name_sw: name.to_string(),
            name_en: name.to_string(),
            population: Some(12_000),
            area_sq_km: Some(4.5),
        }
    }

    fn street_input(name: &str) -> CreateStreet {
        CreateStreet {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_region_code() {
        let repo = InMemoryLocationRepository::new();
        repo.create_region(region_input("DSM", "Dar es Salaam"))
            .await
            .unwrap();

        let result = repo.create_region(region_input("DSM", "Other")).await;
        assert!(matches!(result, Err(LocationError::DuplicateCode(code)) if code == "DSM"));
    }

    #[tokio::test]
    async fn test_child_requires_existing_parent() {
        let repo = InMemoryLocationRepository::new();
        let missing = Uuid::now_v7();

        let result = repo
            .create_district(missing, district_input("KIN", "Kinondoni"))
            .await;

        assert!(matches!(
            result,
            Err(LocationError::NotFound { kind: LocationKind::Region, id }) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_delete_region_cascades_to_all_descendants() {
        let repo = InMemoryLocationRepository::new();
        let region = repo
            .create_region(region_input("DSM", "Dar es Salaam"))
            .await
            .unwrap();
        let district = repo
            .create_district(region.id, district_input("KIN", "Kinondoni"))
            .await
            .unwrap();
        let ward = repo
            .create_ward(district.id, ward_input("MSA", "Msasani"))
            .await
            .unwrap();
        let street = repo
            .create_street(ward.id, street_input("Mtaa wa Bahari"))
            .await
            .unwrap();

        assert!(repo.delete_region(region.id).await.unwrap());

        assert!(repo.get_district(district.id).await.unwrap().is_none());
        assert!(repo.get_ward(ward.id).await.unwrap().is_none());
        assert!(repo.get_street(street.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_ward_keeps_siblings() {
        let repo = InMemoryLocationRepository::new();
        let region = repo
            .create_region(region_input("DSM", "Dar es Salaam"))
            .await
            .unwrap();
        let district = repo
            .create_district(region.id, district_input("KIN", "Kinondoni"))
            .await
            .unwrap();
        let doomed = repo
            .create_ward(district.id, ward_input("MSA", "Msasani"))
            .await
            .unwrap();
        let kept = repo
            .create_ward(district.id, ward_input("MIK", "Mikocheni"))
            .await
            .unwrap();
        repo.create_street(kept.id, street_input("Mtaa wa Amani"))
            .await
            .unwrap();

        assert!(repo.delete_ward(doomed.id).await.unwrap());
        assert!(!repo.delete_ward(doomed.id).await.unwrap());

        let wards = repo.list_wards(district.id).await.unwrap();
        assert_eq!(wards, vec![kept.clone()]);
        assert_eq!(repo.list_streets(kept.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lists_are_ordered_by_name() {
        let repo = InMemoryLocationRepository::new();
        repo.create_region(region_input("MWZ", "Mwanza")).await.unwrap();
        repo.create_region(region_input("ARU", "Arusha")).await.unwrap();
        repo.create_region(region_input("DOD", "Dodoma")).await.unwrap();

        let names: Vec<String> = repo
            .list_regions()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name_en)
            .collect();

        assert_eq!(names, vec!["Arusha", "Dodoma", "Mwanza"]);
    }
}
