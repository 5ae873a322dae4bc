use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{district, region, street, ward},
    error::{LocationError, LocationKind, LocationResult},
    models::{CreateDistrict, CreateRegion, CreateStreet, CreateWard, District, Region, Street, Ward},
    repository::LocationRepository,
};

/// PostgreSQL implementation of LocationRepository
///
/// Cascading deletes are carried by the foreign keys created in the
/// `migration` crate, so each delete is a single statement.
pub struct PgLocationRepository {
    regions: BaseRepository<region::Entity>,
    districts: BaseRepository<district::Entity>,
    wards: BaseRepository<ward::Entity>,
    streets: BaseRepository<street::Entity>,
}

impl PgLocationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            regions: BaseRepository::new(db.clone()),
            districts: BaseRepository::new(db.clone()),
            wards: BaseRepository::new(db.clone()),
            streets: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.regions.db()
    }
}

fn db_error(e: DbErr) -> LocationError {
    LocationError::Internal(format!("Database error: {}", e))
}

/// A concurrent insert can still trip the unique index after the pre-check
fn write_error(e: DbErr, code: &str) -> LocationError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => LocationError::DuplicateCode(code.to_string()),
        _ => db_error(e),
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn create_region(&self, input: CreateRegion) -> LocationResult<Region> {
        let txn = self.db().begin().await.map_err(db_error)?;

        let taken = region::Entity::find()
            .filter(region::Column::Code.eq(&input.code))
            .one(&txn)
            .await
            .map_err(db_error)?
            .is_some();
        if taken {
            return Err(LocationError::DuplicateCode(input.code));
        }

        let code = input.code.clone();
        let model = region::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name_sw: Set(input.name_sw),
            name_en: Set(input.name_en),
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error(e, &code))?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(region_id = %model.id, code = %model.code, "Created region");
        Ok(model.into())
    }

    async fn get_region(&self, id: Uuid) -> LocationResult<Option<Region>> {
        let model = self.regions.find_by_id(id).await.map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn list_regions(&self) -> LocationResult<Vec<Region>> {
        let models = region::Entity::find()
            .order_by_asc(region::Column::NameEn)
            .all(self.db())
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_region(&self, id: Uuid) -> LocationResult<bool> {
        let deleted = self.regions.delete_by_id(id).await.map_err(db_error)?;
        if deleted {
            tracing::info!(region_id = %id, "Deleted region");
        }
        Ok(deleted)
    }

    async fn create_district(
        &self,
        region_id: Uuid,
        input: CreateDistrict,
    ) -> LocationResult<District> {
        let txn = self.db().begin().await.map_err(db_error)?;

        region::Entity::find_by_id(region_id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(LocationError::not_found(LocationKind::Region, region_id))?;

        let taken = district::Entity::find()
            .filter(district::Column::Code.eq(&input.code))
            .one(&txn)
            .await
            .map_err(db_error)?
            .is_some();
        if taken {
            return Err(LocationError::DuplicateCode(input.code));
        }

        let code = input.code.clone();
        let model = district::ActiveModel {
            id: Set(Uuid::now_v7()),
            region_id: Set(region_id),
            code: Set(input.code),
            name_sw: Set(input.name_sw),
            name_en: Set(input.name_en),
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error(e, &code))?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(district_id = %model.id, %region_id, "Created district");
        Ok(model.into())
    }

    async fn get_district(&self, id: Uuid) -> LocationResult<Option<District>> {
        let model = self.districts.find_by_id(id).await.map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn list_districts(&self, region_id: Uuid) -> LocationResult<Vec<District>> {
        let models = district::Entity::find()
            .filter(district::Column::RegionId.eq(region_id))
            .order_by_asc(district::Column::NameEn)
            .all(self.db())
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_district(&self, id: Uuid) -> LocationResult<bool> {
        let deleted = self.districts.delete_by_id(id).await.map_err(db_error)?;
        if deleted {
            tracing::info!(district_id = %id, "Deleted district");
        }
        Ok(deleted)
    }

    async fn create_ward(&self, district_id: Uuid, input: CreateWard) -> LocationResult<Ward> {
        let txn = self.db().begin().await.map_err(db_error)?;

        district::Entity::find_by_id(district_id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(LocationError::not_found(LocationKind::District, district_id))?;

        let taken = ward::Entity::find()
            .filter(ward::Column::Code.eq(&input.code))
            .one(&txn)
            .await
            .map_err(db_error)?
            .is_some();
        if taken {
            return Err(LocationError::DuplicateCode(input.code));
        }

        let code = input.code.clone();
        let model = ward::ActiveModel {
            id: Set(Uuid::now_v7()),
            district_id: Set(district_id),
            code: Set(input.code),
            name_sw: Set(input.name_sw),
            name_en: Set(input.name_en),
            population: Set(input.population),
            area_sq_km: Set(input.area_sq_km),
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error(e, &code))?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(ward_id = %model.id, %district_id, "Created ward");
        Ok(model.into())
    }

    async fn get_ward(&self, id: Uuid) -> LocationResult<Option<Ward>> {
        let model = self.wards.find_by_id(id).await.map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn list_wards(&self, district_id: Uuid) -> LocationResult<Vec<Ward>> {
        let models = ward::Entity::find()
            .filter(ward::Column::DistrictId.eq(district_id))
            .order_by_asc(ward::Column::NameEn)
            .all(self.db())
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_ward(&self, id: Uuid) -> LocationResult<bool> {
        let deleted = self.wards.delete_by_id(id).await.map_err(db_error)?;
        if deleted {
            tracing::info!(ward_id = %id, "Deleted ward");
        }
        Ok(deleted)
    }

    async fn create_street(&self, ward_id: Uuid, input: CreateStreet) -> LocationResult<Street> {
        let txn = self.db().begin().await.map_err(db_error)?;

        ward::Entity::find_by_id(ward_id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(LocationError::not_found(LocationKind::Ward, ward_id))?;

        let model = street::ActiveModel {
            id: Set(Uuid::now_v7()),
            ward_id: Set(ward_id),
            name: Set(input.name),
            description: Set(input.description),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(street_id = %model.id, %ward_id, "Created street");
        Ok(model.into())
    }

    async fn get_street(&self, id: Uuid) -> LocationResult<Option<Street>> {
        let model = self.streets.find_by_id(id).await.map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn list_streets(&self, ward_id: Uuid) -> LocationResult<Vec<Street>> {
        let models = street::Entity::find()
            .filter(street::Column::WardId.eq(ward_id))
            .order_by_asc(street::Column::Name)
            .all(self.db())
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_street(&self, id: Uuid) -> LocationResult<bool> {
        let deleted = self.streets.delete_by_id(id).await.map_err(db_error)?;
        if deleted {
            tracing::info!(street_id = %id, "Deleted street");
        }
        Ok(deleted)
    }
}
