use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "districts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub region_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name_sw: String,
    pub name_en: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::Id",
        on_delete = "Cascade"
    )]
    Region,
    #[sea_orm(has_many = "super::ward::Entity")]
    Ward,
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl Related<super::ward::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ward.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::District {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            region_id: model.region_id,
            code: model.code,
            name_sw: model.name_sw,
            name_en: model.name_en,
        }
    }
}
