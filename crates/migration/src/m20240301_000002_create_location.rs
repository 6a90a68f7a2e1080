//! Create `location` table (pens, rooms and barns) with FK to `organization`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(uuid(Location::Id).primary_key())
                    .col(uuid(Location::OrganizationId).not_null())
                    .col(string_len(Location::Number, 64).not_null())
                    .col(string_len(Location::LocationType, 32).not_null())
                    .col(string_len(Location::ProductionPhase, 32).not_null())
                    .col(double_null(Location::SquareMeter))
                    .col(integer_null(Location::Manger))
                    .col(integer_null(Location::Through))
                    .col(timestamp_with_time_zone(Location::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Location::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Location::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_organization")
                            .from(Location::Table, Location::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Location::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Location {
    Table,
    Id,
    OrganizationId,
    Number,
    LocationType,
    ProductionPhase,
    SquareMeter,
    Manger,
    Through,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Organization { Table, Id }
