use crate::models::{Role, User};
use database::SoftDelete;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub ward_id: Option<Uuid>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub last_login: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "domain_locations::entity::ward::Entity",
        from = "Column::WardId",
        to = "domain_locations::entity::ward::Column::Id",
        on_delete = "SetNull"
    )]
    Ward,
}

impl Related<domain_locations::entity::ward::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ward.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            phone_number: model.phone_number,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role,
            ward_id: model.ward_id,
            is_active: model.is_active,
            is_verified: model.is_verified,
            is_staff: model.is_staff,
            soft_delete: SoftDelete::from_deleted_at(model.deleted_at.map(Into::into)),
            last_login: model.last_login.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

// Every column is set, so the same value serves inserts and full-row updates
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            phone_number: Set(user.phone_number.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role),
            ward_id: Set(user.ward_id),
            is_active: Set(user.is_active),
            is_verified: Set(user.is_verified),
            is_staff: Set(user.is_staff),
            is_deleted: Set(user.soft_delete.is_deleted()),
            deleted_at: Set(user.soft_delete.deleted_at().map(Into::into)),
            last_login: Set(user.last_login.map(Into::into)),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
