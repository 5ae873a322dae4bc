use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{LocationError, LocationKind, LocationResult};
use crate::models::{
    CreateDistrict, CreateRegion, CreateStreet, CreateWard, District, Region, Street, Ward,
};
use crate::repository::LocationRepository;

/// Service layer for the location hierarchy
#[derive(Clone)]
pub struct LocationService<R: LocationRepository> {
    repository: Arc<R>,
}

fn validate(input: &impl Validate) -> LocationResult<()> {
    input
        .validate()
        .map_err(|e| LocationError::Validation(e.to_string()))
}

impl<R: LocationRepository> LocationService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_region(&self, input: CreateRegion) -> LocationResult<Region> {
        validate(&input)?;
        self.repository.create_region(input).await
    }

    pub async fn get_region(&self, id: Uuid) -> LocationResult<Region> {
        self.repository
            .get_region(id)
            .await?
            .ok_or(LocationError::not_found(LocationKind::Region, id))
    }

    pub async fn list_regions(&self) -> LocationResult<Vec<Region>> {
        self.repository.list_regions().await
    }

    pub async fn delete_region(&self, id: Uuid) -> LocationResult<()> {
        if !self.repository.delete_region(id).await? {
            return Err(LocationError::not_found(LocationKind::Region, id));
        }
        Ok(())
    }

    pub async fn create_district(
        &self,
        region_id: Uuid,
        input: CreateDistrict,
    ) -> LocationResult<District> {
        validate(&input)?;
        self.repository.create_district(region_id, input).await
    }

    pub async fn get_district(&self, id: Uuid) -> LocationResult<District> {
        self.repository
            .get_district(id)
            .await?
            .ok_or(LocationError::not_found(LocationKind::District, id))
    }

    /// Districts of a region; an unknown region is `NotFound` rather than empty
    pub async fn list_districts(&self, region_id: Uuid) -> LocationResult<Vec<District>> {
        self.get_region(region_id).await?;
        self.repository.list_districts(region_id).await
    }

    pub async fn delete_district(&self, id: Uuid) -> LocationResult<()> {
        if !self.repository.delete_district(id).await? {
            return Err(LocationError::not_found(LocationKind::District, id));
        }
        Ok(())
    }

    pub async fn create_ward(&self, district_id: Uuid, input: CreateWard) -> LocationResult<Ward> {
        validate(&input)?;
        self.repository.create_ward(district_id, input).await
    }

    pub async fn get_ward(&self, id: Uuid) -> LocationResult<Ward> {
        self.repository
            .get_ward(id)
            .await?
            .ok_or(LocationError::not_found(LocationKind::Ward, id))
    }

    pub async fn list_wards(&self, district_id: Uuid) -> LocationResult<Vec<Ward>> {
        self.get_district(district_id).await?;
        self.repository.list_wards(district_id).await
    }

    pub async fn delete_ward(&self, id: Uuid) -> LocationResult<()> {
        if !self.repository.delete_ward(id).await? {
            return Err(LocationError::not_found(LocationKind::Ward, id));
        }
        Ok(())
    }

    pub async fn create_street(&self, ward_id: Uuid, input: CreateStreet) -> LocationResult<Street> {
        validate(&input)?;
        self.repository.create_street(ward_id, input).await
    }

    pub async fn get_street(&self, id: Uuid) -> LocationResult<Street> {
        self.repository
            .get_street(id)
            .await?
            .ok_or(LocationError::not_found(LocationKind::Street, id))
    }

    pub async fn list_streets(&self, ward_id: Uuid) -> LocationResult<Vec<Street>> {
        self.get_ward(ward_id).await?;
        self.repository.list_streets(ward_id).await
    }

    pub async fn delete_street(&self, id: Uuid) -> LocationResult<()> {
        if !self.repository.delete_street(id).await? {
            return Err(LocationError::not_found(LocationKind::Street, id));
        }
        Ok(())
    }
}
