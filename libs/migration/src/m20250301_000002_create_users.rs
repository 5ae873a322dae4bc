use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_locations::Wards;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len(Users::FirstName, 20))
                    .col(string_len(Users::LastName, 20))
                    .col(string_len(Users::PhoneNumber, 20).unique_key())
                    .col(string_len(Users::Email, 100).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::Role, 30).default("household"))
                    .col(uuid_null(Users::WardId))
                    .col(boolean(Users::IsActive).default(true))
                    .col(boolean(Users::IsVerified).default(false))
                    .col(boolean(Users::IsStaff).default(false))
                    .col(boolean(Users::IsDeleted).default(false))
                    .col(timestamp_with_time_zone_null(Users::DeletedAt))
                    .col(timestamp_with_time_zone_null(Users::LastLogin))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_ward_id")
                            .from(Users::Table, Users::WardId)
                            .to(Wards::Table, Wards::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The soft-delete flag and its timestamp always move together
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE users
                    ADD CONSTRAINT users_soft_delete_consistent
                    CHECK (is_deleted = (deleted_at IS NOT NULL)),
                    ADD CONSTRAINT users_role_known
                    CHECK (role IN ('admin', 'ward_officer', 'collector', 'driver', 'household'))
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_ward_id")
                    .table(Users::Table)
                    .col(Users::WardId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER users_touch_updated_at
                    BEFORE UPDATE ON users
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS users_touch_updated_at ON users")
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    PhoneNumber,
    Email,
    PasswordHash,
    Role,
    WardId,
    IsActive,
    IsVerified,
    IsStaff,
    IsDeleted,
    DeletedAt,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}
