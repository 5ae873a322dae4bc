use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Regions::Table)
                    .if_not_exists()
                    .col(pk_uuid(Regions::Id))
                    .col(string_len(Regions::Code, 10).unique_key())
                    .col(string_len(Regions::NameSw, 100))
                    .col(string_len(Regions::NameEn, 100))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Districts::Table)
                    .if_not_exists()
                    .col(pk_uuid(Districts::Id))
                    .col(uuid(Districts::RegionId))
                    .col(string_len(Districts::Code, 10).unique_key())
                    .col(string_len(Districts::NameSw, 100))
                    .col(string_len(Districts::NameEn, 100))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_districts_region_id")
                            .from(Districts::Table, Districts::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wards::Table)
                    .if_not_exists()
                    .col(pk_uuid(Wards::Id))
                    .col(uuid(Wards::DistrictId))
                    .col(string_len(Wards::Code, 20).unique_key())
                    .col(string_len(Wards::NameSw, 100))
                    .col(string_len(Wards::NameEn, 100))
                    .col(integer_null(Wards::Population))
                    .col(double_null(Wards::AreaSqKm))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wards_district_id")
                            .from(Wards::Table, Wards::DistrictId)
                            .to(Districts::Table, Districts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Streets::Table)
                    .if_not_exists()
                    .col(pk_uuid(Streets::Id))
                    .col(uuid(Streets::WardId))
                    .col(string_len(Streets::Name, 200))
                    .col(text_null(Streets::Description))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_streets_ward_id")
                            .from(Streets::Table, Streets::WardId)
                            .to(Wards::Table, Wards::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Parent lookups for the list endpoints
        manager
            .create_index(
                Index::create()
                    .name("idx_districts_region_id")
                    .table(Districts::Table)
                    .col(Districts::RegionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wards_district_id")
                    .table(Wards::Table)
                    .col(Wards::DistrictId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_streets_ward_id")
                    .table(Streets::Table)
                    .col(Streets::WardId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Streets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Wards::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Districts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Regions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Regions {
    Table,
    Id,
    Code,
    NameSw,
    NameEn,
}

#[derive(DeriveIden)]
enum Districts {
    Table,
    Id,
    RegionId,
    Code,
    NameSw,
    NameEn,
}

#[derive(DeriveIden)]
pub(crate) enum Wards {
    Table,
    Id,
    DistrictId,
    Code,
    NameSw,
    NameEn,
    Population,
    AreaSqKm,
}

#[derive(DeriveIden)]
enum Streets {
    Table,
    Id,
    WardId,
    Name,
    Description,
}
