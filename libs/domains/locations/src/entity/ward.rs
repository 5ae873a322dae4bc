use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub district_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name_sw: String,
    pub name_en: String,
    pub population: Option<i32>,
    pub area_sq_km: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::district::Entity",
        from = "Column::DistrictId",
        to = "super::district::Column::Id",
        on_delete = "Cascade"
    )]
    District,
    #[sea_orm(has_many = "super::street::Entity")]
    Street,
}

impl Related<super::district::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::District.def()
    }
}

impl Related<super::street::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Street.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Ward {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            district_id: model.district_id,
            code: model.code,
            name_sw: model.name_sw,
            name_en: model.name_en,
            population: model.population,
            area_sq_km: model.area_sq_km,
        }
    }
}
