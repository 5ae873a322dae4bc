use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Top-level administrative area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Region {
    pub id: Uuid,
    pub code: String,
    /// Swahili name
    pub name_sw: String,
    /// English name
    pub name_en: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct District {
    pub id: Uuid,
    pub region_id: Uuid,
    pub code: String,
    pub name_sw: String,
    pub name_en: String,
}

/// Smallest administrative unit that users are assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ward {
    pub id: Uuid,
    pub district_id: Uuid,
    pub code: String,
    pub name_sw: String,
    pub name_en: String,
    pub population: Option<i32>,
    pub area_sq_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Street {
    pub id: Uuid,
    pub ward_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name_en)
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name_en)
    }
}

impl fmt::Display for Ward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name_en)
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateRegion {
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name_sw: String,
    #[validate(length(min = 1, max = 100))]
    pub name_en: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateDistrict {
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name_sw: String,
    #[validate(length(min = 1, max = 100))]
    pub name_en: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateWard {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name_sw: String,
    #[validate(length(min = 1, max = 100))]
    pub name_en: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub population: Option<i32>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub area_sq_km: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateStreet {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Region {
    pub fn new(input: CreateRegion) -> Self {
        Self {
            id: Uuid::now_v7(),
            code: input.code,
            name_sw: input.name_sw,
            name_en: input.name_en,
        }
    }
}

impl District {
    pub fn new(region_id: Uuid, input: CreateDistrict) -> Self {
        Self {
            id: Uuid::now_v7(),
            region_id,
            code: input.code,
            name_sw: input.name_sw,
            name_en: input.name_en,
        }
    }
}

impl Ward {
    pub fn new(district_id: Uuid, input: CreateWard) -> Self {
        Self {
            id: Uuid::now_v7(),
            district_id,
            code: input.code,
            name_sw: input.name_sw,
            name_en: input.name_en,
            population: input.population,
            area_sq_km: input.area_sq_km,
        }
    }
}

impl Street {
    pub fn new(ward_id: Uuid, input: CreateStreet) -> Self {
        Self {
            id: Uuid::now_v7(),
            ward_id,
            name: input.name,
            description: input.description,
        }
    }
}
